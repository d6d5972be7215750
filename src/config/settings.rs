use crate::adapters::http::{ApiCredentials, ClientOptions};
use crate::domain::model::CredentialOverrides;
use crate::utils::error::{RateError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url};
use std::env;

pub const TOKEN_ENV: &str = "INSUREMO_API_TOKEN";
pub const BASE_URL_ENV: &str = "INSUREMO_BASE_URL";

/// 評價 API 的連線設定；憑證可以稍後由單次請求覆寫
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiSettings {
    pub base_url: Option<String>,
    pub api_token: Option<String>,
    pub options: ClientOptions,
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            api_token: Some(api_token.into()),
            options: ClientOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// 從環境變數讀取；缺少的值留到 `resolve` 時才報錯
    pub fn from_env() -> Self {
        Self {
            base_url: non_blank(env::var(BASE_URL_ENV).ok()),
            api_token: non_blank(env::var(TOKEN_ENV).ok()),
            options: ClientOptions::default(),
        }
    }

    /// 以 `other` 中有值的欄位補上尚未設定的欄位
    pub fn or(mut self, other: ApiSettings) -> Self {
        self.base_url = self.base_url.or(other.base_url);
        self.api_token = self.api_token.or(other.api_token);
        self
    }

    /// 合併單次請求的覆寫並驗證
    pub fn resolve(&self, overrides: &CredentialOverrides) -> Result<ApiCredentials> {
        let api_token = non_blank(overrides.api_token.clone())
            .or_else(|| self.api_token.clone())
            .ok_or_else(|| RateError::ConfigError {
                message: format!("API token required. Provide as parameter or set {}", TOKEN_ENV),
            })?;
        let base_url = non_blank(overrides.base_url.clone())
            .or_else(|| self.base_url.clone())
            .ok_or_else(|| RateError::ConfigError {
                message: format!("Base URL required. Provide as parameter or set {}", BASE_URL_ENV),
            })?;

        validate_non_empty_string("api_token", &api_token)?;
        validate_url("base_url", &base_url)?;

        Ok(ApiCredentials { base_url, api_token })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;

    #[test]
    fn test_request_overrides_take_precedence() {
        let settings = ApiSettings::new("https://configured.example.com", "configured-token");
        let overrides = CredentialOverrides {
            api_token: Some("override-token".to_string()),
            base_url: None,
        };

        let credentials = settings.resolve(&overrides).unwrap();
        assert_eq!(credentials.api_token, "override-token");
        assert_eq!(credentials.base_url, "https://configured.example.com");
    }

    #[test]
    fn test_blank_override_falls_back_to_settings() {
        let settings = ApiSettings::new("https://configured.example.com", "configured-token");
        let overrides = CredentialOverrides {
            api_token: Some("  ".to_string()),
            base_url: Some(String::new()),
        };

        let credentials = settings.resolve(&overrides).unwrap();
        assert_eq!(credentials.api_token, "configured-token");
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let settings = ApiSettings {
            base_url: Some("https://configured.example.com".to_string()),
            ..ApiSettings::default()
        };

        let err = settings.resolve(&CredentialOverrides::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigError);
        assert!(err.to_string().contains(TOKEN_ENV));
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let settings = ApiSettings::new("not a url", "token");
        let err = settings.resolve(&CredentialOverrides::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigError);
    }

    #[test]
    fn test_or_fills_only_missing_fields() {
        let primary = ApiSettings {
            api_token: Some("cli-token".to_string()),
            ..ApiSettings::default()
        };
        let merged = primary.or(ApiSettings::new("https://env.example.com", "env-token"));

        assert_eq!(merged.api_token.as_deref(), Some("cli-token"));
        assert_eq!(merged.base_url.as_deref(), Some("https://env.example.com"));
    }
}
