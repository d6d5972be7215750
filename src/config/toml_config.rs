use crate::adapters::http::{ClientOptions, RetryPolicy};
use crate::app::formatters::ResponseFormat;
use crate::config::settings::ApiSettings;
use crate::utils::error::{RateError, Result};
use crate::utils::validation::{validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaterConfig {
    #[serde(default)]
    pub api: ApiConfig,
    pub retry: Option<RetryConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: Option<u32>,
    pub backoff_factor: Option<f64>,
    pub status_forcelist: Option<Vec<u16>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: Option<ResponseFormat>,
}

impl RaterConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RateError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| RateError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${INSUREMO_API_TOKEN})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern compiles"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(base_url) = unresolved_is_none(&self.api.base_url) {
            validate_url("api.base_url", base_url)?;
        }

        if let Some(timeout) = self.api.timeout_seconds {
            validate_range("api.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(retry) = &self.retry {
            if let Some(max_retries) = retry.max_retries {
                validate_range("retry.max_retries", max_retries, 0, 10)?;
            }
            if let Some(factor) = retry.backoff_factor {
                validate_range("retry.backoff_factor", factor, 0.0, 60.0)?;
            }
            if let Some(statuses) = &retry.status_forcelist {
                for status in statuses {
                    validate_range("retry.status_forcelist", *status, 400, 599)?;
                }
            }
        }

        Ok(())
    }

    pub fn client_options(&self) -> ClientOptions {
        let defaults = ClientOptions::default();
        let mut retry = RetryPolicy::default();
        if let Some(config) = &self.retry {
            retry.max_retries = config.max_retries.unwrap_or(retry.max_retries);
            retry.backoff_factor = config.backoff_factor.unwrap_or(retry.backoff_factor);
            if let Some(statuses) = &config.status_forcelist {
                retry.retry_statuses = statuses.clone();
            }
        }

        ClientOptions {
            timeout: self
                .api
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            retry,
        }
    }

    /// 轉成 `ApiSettings`；仍是 `${VAR}` 形式的值視為未設定
    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: unresolved_is_none(&self.api.base_url).map(str::to_string),
            api_token: unresolved_is_none(&self.api.token).map(str::to_string),
            options: self.client_options(),
        }
    }

    pub fn output_format(&self) -> Option<ResponseFormat> {
        self.output.as_ref().and_then(|o| o.format)
    }
}

fn unresolved_is_none(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty() && !v.contains("${"))
}

impl Validate for RaterConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
