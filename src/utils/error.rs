use serde::Serialize;
use thiserror::Error;

/// 對外回報的錯誤分類（對應結果 JSON 的 `errorDetails.type`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    ConfigError,
    HttpError,
    NetworkError,
    MissingProposalNumber,
    UnexpectedError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::ConfigError => "ConfigError",
            ErrorKind::HttpError => "HttpError",
            ErrorKind::NetworkError => "NetworkError",
            ErrorKind::MissingProposalNumber => "MissingProposalNumber",
            ErrorKind::UnexpectedError => "UnexpectedError",
        }
    }

    /// 給操作人員的處理建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => {
                "Provide customerName, address1, city, state (2 letters) and a 5 or 9 digit zipCode"
            }
            ErrorKind::ConfigError => {
                "Set INSUREMO_API_TOKEN and INSUREMO_BASE_URL or pass --api-token/--base-url"
            }
            ErrorKind::HttpError => "Check the request payload and API token; the rating API rejected the call",
            ErrorKind::NetworkError => "The rating API is unreachable or overloaded; try again later",
            ErrorKind::MissingProposalNumber => {
                "The create flow did not return a proposal; verify product and agent codes"
            }
            ErrorKind::UnexpectedError => "Inspect the logs with --verbose for the raw API response",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 評價流程中失敗的步驟
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Create,
    Calculate,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Create => f.write_str("create"),
            Stage::Calculate => f.write_str("calculate"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RateError {
    #[error("Missing required fields: {}", .missing_fields.join(", "))]
    MissingFieldsError { missing_fields: Vec<String> },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidFieldError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("API returned status {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("API request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Retries exhausted after {attempts} attempts (last status {status})")]
    RetriesExhausted { status: u16, attempts: u32 },

    #[error("No proposal number returned from create API")]
    MissingProposalNumber,

    #[error("Failed to create policy: {source}")]
    CreateFailed {
        #[source]
        source: Box<RateError>,
    },

    #[error("Failed to calculate premium: {source}")]
    CalculationFailed {
        #[source]
        source: Box<RateError>,
    },

    #[error("Unexpected API response: {message}")]
    InvalidResponse { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RateError {
    pub fn create_failed(source: RateError) -> Self {
        RateError::CreateFailed {
            source: Box::new(source),
        }
    }

    pub fn calculation_failed(source: RateError) -> Self {
        RateError::CalculationFailed {
            source: Box::new(source),
        }
    }

    /// 錯誤分類；包裝型錯誤回報其根因的分類
    pub fn kind(&self) -> ErrorKind {
        match self {
            RateError::MissingFieldsError { .. } | RateError::InvalidFieldError { .. } => {
                ErrorKind::ValidationError
            }
            RateError::ConfigError { .. } | RateError::InvalidConfigValueError { .. } => {
                ErrorKind::ConfigError
            }
            RateError::HttpError { .. } => ErrorKind::HttpError,
            RateError::NetworkError(_) | RateError::RetriesExhausted { .. } => {
                ErrorKind::NetworkError
            }
            RateError::MissingProposalNumber => ErrorKind::MissingProposalNumber,
            RateError::CreateFailed { source } | RateError::CalculationFailed { source } => {
                source.kind()
            }
            RateError::InvalidResponse { .. } | RateError::IoError(_) => ErrorKind::UnexpectedError,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            RateError::CreateFailed { .. } => Some(Stage::Create),
            RateError::CalculationFailed { .. } => Some(Stage::Calculate),
            _ => None,
        }
    }

    pub fn missing_fields(&self) -> &[String] {
        match self {
            RateError::MissingFieldsError { missing_fields } => missing_fields,
            _ => &[],
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        self.kind().recovery_suggestion()
    }
}

pub type Result<T> = std::result::Result<T, RateError>;
