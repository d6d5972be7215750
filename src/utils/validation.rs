use crate::utils::error::{RateError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static STATE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("state code pattern compiles"));
static ZIP_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("zip code pattern compiles"));

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RateError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(RateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 回傳缺少（不存在或空白）的必填欄位名稱，保持傳入順序
pub fn collect_missing<'a>(fields: &[(&'a str, Option<&str>)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect()
}

pub fn validate_state_code(field_name: &str, value: &str) -> Result<()> {
    if !STATE_CODE.is_match(value) {
        return Err(RateError::InvalidFieldError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "State must be a 2-letter uppercase code".to_string(),
        });
    }
    Ok(())
}

pub fn validate_zip_code(field_name: &str, value: &str) -> Result<()> {
    if !ZIP_CODE.is_match(value) {
        return Err(RateError::InvalidFieldError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "ZIP code must be NNNNN or NNNNN-NNNN".to_string(),
        });
    }
    Ok(())
}
