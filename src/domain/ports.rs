use crate::domain::document::PolicyDocument;
use crate::domain::model::{RatingRequest, RatingResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// 遠端評價 API 的兩個步驟
#[async_trait]
pub trait RatingApi: Send + Sync {
    async fn create_policy(&self, document: &PolicyDocument) -> Result<PolicyDocument>;
    async fn calculate_premium(&self, document: &PolicyDocument) -> Result<PolicyDocument>;
}

/// 將評價結果整形成呼叫端需要的 JSON
pub trait ResponseFormatter: Send + Sync {
    fn format(&self, result: &RatingResult, request: &RatingRequest) -> serde_json::Value;
}

/// 提供「今天」的日期；payload 中唯一的不確定輸入
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
