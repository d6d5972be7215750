use crate::domain::model::{RatingRequest, RatingResult};
use crate::domain::ports::ResponseFormatter;
use crate::utils::error::RateError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;

/// 輸出形式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseFormat {
    #[default]
    Raw,
    AgentSummary,
}

impl ResponseFormat {
    pub fn formatter(self) -> Box<dyn ResponseFormatter> {
        match self {
            ResponseFormat::Raw => Box::new(RawFormatter),
            ResponseFormat::AgentSummary => Box::new(AgentSummaryFormatter),
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(ResponseFormat::Raw),
            "agent-summary" | "agent_summary" | "summary" => Ok(ResponseFormat::AgentSummary),
            other => Err(RateError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Expected 'raw' or 'agent-summary'".to_string(),
            }),
        }
    }
}

/// 原樣輸出標準結果 JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFormatter;

impl ResponseFormatter for RawFormatter {
    fn format(&self, result: &RatingResult, _request: &RatingRequest) -> Value {
        result.to_json()
    }
}

/// 給 agent 使用：標準結果再加上一句 `summary`
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentSummaryFormatter;

impl AgentSummaryFormatter {
    pub fn summarize(result: &RatingResult, request: &RatingRequest) -> String {
        let business = match request.customer_name() {
            "" => "the business",
            name => name,
        };

        match result {
            RatingResult::Success(quote) => {
                let mut summary = format!(
                    "Quote {} for {}: total premium {} (general liability {}, property {})",
                    quote.proposal_no,
                    business,
                    usd(quote.total_premium),
                    usd(quote.gl_premium),
                    usd(quote.property_premium),
                );
                if let (Some(effective), Some(expiry)) = (&quote.effective_date, &quote.expiry_date) {
                    summary.push_str(&format!(", term {} to {}", effective, expiry));
                }
                if quote.commission > 0.0 {
                    summary.push_str(&format!(
                        ", commission {} ({:.1}%)",
                        usd(quote.commission),
                        quote.commission_rate * 100.0
                    ));
                }
                summary.push('.');
                summary
            }
            RatingResult::Failure(report) => format!(
                "Rating failed for {} ({}): {}",
                business, report.error_details.kind, report.error
            ),
        }
    }
}

impl ResponseFormatter for AgentSummaryFormatter {
    fn format(&self, result: &RatingResult, request: &RatingRequest) -> Value {
        let mut value = result.to_json();
        if let Some(fields) = value.as_object_mut() {
            fields.insert("summary".to_string(), json!(Self::summarize(result, request)));
        }
        value
    }
}

/// 金額格式：$1,234.50
fn usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FailureReport, PremiumBreakdown, Quote};

    fn quote() -> Quote {
        Quote {
            proposal_no: "POCGL0000123".to_string(),
            policy_id: Some(987),
            total_premium: 5234.0,
            gross_premium: 5234.0,
            commission: 523.4,
            commission_rate: 0.1,
            gl_premium: 2500.0,
            property_premium: 2734.0,
            effective_date: Some("2026-10-19".to_string()),
            expiry_date: Some("2027-10-19".to_string()),
            premium_breakdown: PremiumBreakdown {
                total_premium: 5234.0,
                gross_premium: 5234.0,
                gl_premium: 2500.0,
                property_premium: 2734.0,
                ..PremiumBreakdown::default()
            },
        }
    }

    fn request() -> RatingRequest {
        RatingRequest::new("Sweet Dreams Bakery LLC", "123 Main Street", "Houston", "TX", "77001")
    }

    #[test]
    fn test_raw_success_shape() {
        let value = RawFormatter.format(&RatingResult::Success(quote()), &request());

        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for key in [
            "success",
            "proposalNo",
            "policyId",
            "totalPremium",
            "grossPremium",
            "commission",
            "commissionRate",
            "glPremium",
            "propertyPremium",
            "effectiveDate",
            "expiryDate",
            "premiumBreakdown",
        ] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert_eq!(value["success"], true);
        assert_eq!(value["glPremium"], 2500.0);
        assert_eq!(value["premiumBreakdown"]["biPremium"], 0.0);
        assert!(value.get("summary").is_none());
    }

    #[test]
    fn test_agent_summary_success() {
        let value = AgentSummaryFormatter.format(&RatingResult::Success(quote()), &request());

        assert_eq!(value["proposalNo"], "POCGL0000123");
        assert_eq!(
            value["summary"],
            "Quote POCGL0000123 for Sweet Dreams Bakery LLC: total premium $5,234.00 \
             (general liability $2,500.00, property $2,734.00), term 2026-10-19 to 2027-10-19, \
             commission $523.40 (10.0%)."
        );
    }

    #[test]
    fn test_agent_summary_failure() {
        let err = RateError::create_failed(RateError::MissingProposalNumber);
        let result = RatingResult::Failure(FailureReport::from(&err));
        let value = AgentSummaryFormatter.format(&result, &request());

        assert_eq!(value["success"], false);
        assert_eq!(value["errorDetails"]["type"], "MissingProposalNumber");
        assert_eq!(value["errorDetails"]["stage"], "create");
        assert_eq!(
            value["summary"],
            "Rating failed for Sweet Dreams Bakery LLC (MissingProposalNumber): \
             Failed to create policy: No proposal number returned from create API"
        );
    }

    #[test]
    fn test_usd_formatting() {
        assert_eq!(usd(0.0), "$0.00");
        assert_eq!(usd(999.999), "$1,000.00");
        assert_eq!(usd(1234567.5), "$1,234,567.50");
        assert_eq!(usd(-12.3), "-$12.30");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("raw".parse::<ResponseFormat>().unwrap(), ResponseFormat::Raw);
        assert_eq!(
            "Agent-Summary".parse::<ResponseFormat>().unwrap(),
            ResponseFormat::AgentSummary
        );
        assert!("xml".parse::<ResponseFormat>().is_err());
    }
}
