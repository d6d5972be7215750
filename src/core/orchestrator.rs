use crate::adapters::http::RatingClient;
use crate::config::settings::ApiSettings;
use crate::core::payload::PayloadBuilder;
use crate::domain::document::PolicyDocument;
use crate::domain::model::{FailureReport, Quote, RatingRequest, RatingResult};
use crate::domain::ports::{Clock, RatingApi, ResponseFormatter, SystemClock};
use crate::utils::error::{RateError, Result};

/// create → calculate 的兩步評價流程；所有錯誤在此轉為失敗結果
pub struct RatingOrchestrator<C: Clock = SystemClock> {
    settings: ApiSettings,
    builder: PayloadBuilder,
    clock: C,
}

impl RatingOrchestrator<SystemClock> {
    pub fn new(settings: ApiSettings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> RatingOrchestrator<C> {
    pub fn with_clock(settings: ApiSettings, clock: C) -> Self {
        Self {
            settings,
            builder: PayloadBuilder::new(),
            clock,
        }
    }

    pub async fn rate(&self, request: &RatingRequest) -> RatingResult {
        match self.try_rate(request).await {
            Ok(quote) => {
                tracing::info!(
                    "✅ Rated {}: proposal {} total premium {:.2}",
                    request.customer_name(),
                    quote.proposal_no,
                    quote.total_premium
                );
                RatingResult::Success(quote)
            }
            Err(e) => {
                tracing::error!(
                    "❌ Rating failed: {} (Kind: {}, Stage: {:?})",
                    e,
                    e.kind(),
                    e.stage()
                );
                RatingResult::Failure(FailureReport::from(&e))
            }
        }
    }

    pub async fn rate_formatted(
        &self,
        request: &RatingRequest,
        formatter: &dyn ResponseFormatter,
    ) -> serde_json::Value {
        let result = self.rate(request).await;
        formatter.format(&result, request)
    }

    async fn try_rate(&self, request: &RatingRequest) -> Result<Quote> {
        request.validate_fields()?;
        let credentials = self.settings.resolve(&request.credentials)?;

        // client 只存活於這次呼叫
        let client = RatingClient::connect(&credentials, &self.settings.options)?;
        self.rate_with(&client, request).await
    }

    /// 對任意 `RatingApi` 執行 build → create → calculate → 萃取
    pub async fn rate_with<A: RatingApi + ?Sized>(
        &self,
        api: &A,
        request: &RatingRequest,
    ) -> Result<Quote> {
        request.validate_fields()?;

        let document = self.builder.build(request, self.clock.today());
        tracing::info!("📝 Creating policy for {}", request.customer_name());
        tracing::debug!("📝 Policy document has {} top-level fields", document.as_map().len());

        let created = api
            .create_policy(&document)
            .await
            .map_err(RateError::create_failed)?;
        let proposal_no = created
            .proposal_no()
            .ok_or_else(|| RateError::create_failed(RateError::MissingProposalNumber))?;
        tracing::info!("📄 Policy created with proposal number: {}", proposal_no);

        tracing::info!("🧮 Calculating premium...");
        let calculated = api
            .calculate_premium(&created)
            .await
            .map_err(RateError::calculation_failed)?;

        Ok(build_quote(&calculated, proposal_no))
    }
}

/// 計算回應的提案號碼缺漏時沿用 create 的值
fn build_quote(calculated: &PolicyDocument, created_proposal_no: String) -> Quote {
    let breakdown = calculated.premium_breakdown();

    Quote {
        proposal_no: calculated.proposal_no().unwrap_or(created_proposal_no),
        policy_id: calculated.policy_id(),
        total_premium: breakdown.total_premium,
        gross_premium: breakdown.gross_premium,
        commission: calculated.number("Commission"),
        commission_rate: calculated.number("CommissionRate"),
        gl_premium: breakdown.gl_premium,
        property_premium: breakdown.property_premium,
        effective_date: calculated.string("EffectiveDate"),
        expiry_date: calculated.string("ExpiryDate"),
        premium_breakdown: breakdown,
    }
}
