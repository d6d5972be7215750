//! reqwest 實作的評價 API 客戶端。
//!
//! 重試對呼叫端透明：429/500/502/503/504 與連線、逾時錯誤會在預算內重送，
//! 預算用盡後以 `NetworkError` 類別回報；其餘非 200 狀態立即以 `HttpError` 回報。

use crate::domain::document::PolicyDocument;
use crate::domain::ports::RatingApi;
use crate::utils::error::{RateError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

pub const CREATE_PATH: &str = "/api/ebaogi/api-orchestration/v1/flow/easypa_createOrSave";
pub const CALCULATE_PATH: &str = "/api/ebaogi/api-orchestration/v1/flow/easypa_calculate";

pub const USER_AGENT: &str = concat!("insuremo-rater/", env!("CARGO_PKG_VERSION"));

const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// 只有這些狀態碼會參考 `Retry-After`
const RETRY_AFTER_STATUSES: [StatusCode; 3] = [
    StatusCode::PAYLOAD_TOO_LARGE,
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::SERVICE_UNAVAILABLE,
];

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 1.0,
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }

    /// 第 n 次重試（從 1 起算）前的等待：第一次不等，之後為 factor × 2^(n-1) 秒
    pub fn backoff_for(&self, retry: u32) -> Duration {
        if retry <= 1 || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let exponent = (retry - 1).min(16) as i32;
        let seconds = (self.backoff_factor * 2f64.powi(exponent)).min(MAX_BACKOFF.as_secs_f64());
        Duration::from_secs_f64(seconds)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// 已解析的憑證；Debug 輸出會遮蔽 token
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub base_url: String,
    pub api_token: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("base_url", &self.base_url)
            .field("api_token", &"***")
            .finish()
    }
}

pub struct RatingClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl RatingClient {
    pub fn connect(credentials: &ApiCredentials, options: &ClientOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", credentials.api_token)).map_err(|_| {
            RateError::ConfigError {
                message: "API token contains characters not allowed in an HTTP header".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(options.timeout)
            .build()?;

        tracing::info!("🔌 Rating client initialized for {}", credentials.base_url);

        Ok(Self {
            client,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            retry: options.retry.clone(),
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_document(&self, path: &str, document: &PolicyDocument) -> Result<PolicyDocument> {
        let url = self.endpoint(path);
        let mut retries = 0u32;

        loop {
            tracing::debug!("📡 POST {} (attempt {})", url, retries + 1);

            match self.client.post(&url).json(document).send().await {
                Ok(response) if self.retry.is_retryable_status(response.status()) => {
                    let status = response.status();
                    if retries >= self.retry.max_retries {
                        tracing::error!("❌ {} still returned {} after {} attempts", url, status, retries + 1);
                        return Err(RateError::RetriesExhausted {
                            status: status.as_u16(),
                            attempts: retries + 1,
                        });
                    }
                    retries += 1;
                    let delay = self.retry.backoff_for(retries).max(retry_after(&response));
                    tracing::warn!(
                        status = status.as_u16(),
                        retry = retries,
                        max_retries = self.retry.max_retries,
                        backoff_ms = delay.as_millis() as u64,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => return Self::read_document(response).await,
                Err(e) if (e.is_connect() || e.is_timeout()) && retries < self.retry.max_retries => {
                    retries += 1;
                    let delay = self.retry.backoff_for(retries);
                    tracing::warn!(
                        error = %e,
                        retry = retries,
                        max_retries = self.retry.max_retries,
                        backoff_ms = delay.as_millis() as u64,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!("❌ POST {} failed: {}", url, e);
                    return Err(RateError::NetworkError(e));
                }
            }
        }
    }

    async fn read_document(response: Response) -> Result<PolicyDocument> {
        let status = response.status();
        tracing::debug!("📡 API response status: {}", status);

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("❌ API returned status {}: {}", status, body);
            return Err(RateError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| RateError::InvalidResponse {
            message: format!("response body is not valid JSON: {}", e),
        })?;
        PolicyDocument::from_value(value)
    }
}

/// `Retry-After` 只支援秒數格式
fn retry_after(response: &Response) -> Duration {
    if !RETRY_AFTER_STATUSES.contains(&response.status()) {
        return Duration::ZERO;
    }

    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::ZERO)
        .min(MAX_BACKOFF)
}

#[async_trait]
impl RatingApi for RatingClient {
    async fn create_policy(&self, document: &PolicyDocument) -> Result<PolicyDocument> {
        self.post_document(CREATE_PATH, document).await
    }

    async fn calculate_premium(&self, document: &PolicyDocument) -> Result<PolicyDocument> {
        self.post_document(CALCULATE_PATH, document).await
    }
}
