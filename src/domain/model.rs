use crate::utils::error::{ErrorKind, RateError, Result, Stage};
use crate::utils::validation::{collect_missing, validate_state_code, validate_zip_code};
use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? } default $default:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = RateError;

            fn from_str(s: &str) -> Result<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| RateError::InvalidFieldError {
                        field: stringify!($name).to_string(),
                        value: s.to_string(),
                        reason: format!(
                            "Expected one of: {}",
                            Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(" | ")
                        ),
                    })
            }
        }
    };
}

string_enum!(
    BusinessType {
        Retail => "Retail",
        Wholesale => "Wholesale",
        Manufacturing => "Manufacturing",
        Service => "Service",
    } default Retail
);

string_enum!(
    LegalStructure {
        Llc => "LLC",
        Corporation => "Corporation",
        Partnership => "Partnership",
        SoleProprietorship => "SoleProprietorship",
    } default Llc
);

string_enum!(
    /// 每次事故責任限額
    EachOccurrenceLimit {
        OneMillion => "1,000,000 CSL",
        TwoMillion => "2,000,000 CSL",
        FiveMillion => "5,000,000 CSL",
    } default OneMillion
);

string_enum!(
    /// 總累計責任限額
    GeneralAggregateLimit {
        TwoMillion => "2,000,000 CSL",
        FourMillion => "4,000,000 CSL",
        TenMillion => "10,000,000 CSL",
    } default TwoMillion
);

/// 單次呼叫覆寫的 API 憑證
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// 評價請求：只有名稱與地址是必填，其餘都有預設值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RatingRequest {
    pub customer_name: Option<String>,
    pub address1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub business_type: BusinessType,
    pub naics_code: String,
    pub naics_definition: String,
    pub legal_structure: LegalStructure,
    pub full_time_empl: u32,
    pub part_time_empl: u32,
    pub building_limit: u64,
    pub bpp_limit: u64,
    pub each_occurrence_limit: EachOccurrenceLimit,
    pub general_aggregate_limit: GeneralAggregateLimit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_code: Option<String>,
    #[serde(flatten)]
    pub credentials: CredentialOverrides,
}

impl Default for RatingRequest {
    fn default() -> Self {
        Self {
            customer_name: None,
            address1: None,
            city: None,
            state: None,
            zip_code: None,
            business_type: BusinessType::default(),
            naics_code: "311811".to_string(),
            naics_definition: "Retail Bakeries".to_string(),
            legal_structure: LegalStructure::default(),
            full_time_empl: 5,
            part_time_empl: 0,
            building_limit: 500_000,
            bpp_limit: 100_000,
            each_occurrence_limit: EachOccurrenceLimit::default(),
            general_aggregate_limit: GeneralAggregateLimit::default(),
            customer_no: None,
            id_no: None,
            post_code: None,
            credentials: CredentialOverrides::default(),
        }
    }
}

impl RatingRequest {
    pub fn new(
        customer_name: impl Into<String>,
        address1: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Self {
        Self {
            customer_name: Some(customer_name.into()),
            address1: Some(address1.into()),
            city: Some(city.into()),
            state: Some(state.into()),
            zip_code: Some(zip_code.into()),
            ..Self::default()
        }
    }

    /// 檢查必填欄位與州碼、郵遞區號格式；不做任何網路呼叫
    pub fn validate_fields(&self) -> Result<()> {
        let missing = collect_missing(&[
            ("customerName", self.customer_name.as_deref()),
            ("address1", self.address1.as_deref()),
            ("city", self.city.as_deref()),
            ("state", self.state.as_deref()),
            ("zipCode", self.zip_code.as_deref()),
        ]);
        if !missing.is_empty() {
            return Err(RateError::MissingFieldsError {
                missing_fields: missing.into_iter().map(str::to_string).collect(),
            });
        }

        validate_state_code("state", self.state())?;
        validate_zip_code("zipCode", self.zip_code())?;
        Ok(())
    }

    pub fn customer_name(&self) -> &str {
        self.customer_name.as_deref().unwrap_or_default()
    }

    pub fn address1(&self) -> &str {
        self.address1.as_deref().unwrap_or_default()
    }

    pub fn city(&self) -> &str {
        self.city.as_deref().unwrap_or_default()
    }

    pub fn state(&self) -> &str {
        self.state.as_deref().unwrap_or_default()
    }

    pub fn zip_code(&self) -> &str {
        self.zip_code.as_deref().unwrap_or_default()
    }

    pub fn customer_no(&self) -> &str {
        self.customer_no.as_deref().unwrap_or("CO00000001")
    }

    pub fn id_no(&self) -> &str {
        self.id_no.as_deref().unwrap_or("01010101")
    }

    /// 未指定時沿用 ZIP
    pub fn post_code(&self) -> &str {
        self.post_code.as_deref().unwrap_or_else(|| self.zip_code())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumBreakdown {
    pub total_premium: f64,
    pub gross_premium: f64,
    pub gl_premium: f64,
    pub property_premium: f64,
    pub building_premium: f64,
    pub bpp_premium: f64,
    pub bi_premium: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub proposal_no: String,
    pub policy_id: Option<i64>,
    pub total_premium: f64,
    pub gross_premium: f64,
    pub commission: f64,
    pub commission_rate: f64,
    pub gl_premium: f64,
    pub property_premium: f64,
    pub effective_date: Option<String>,
    pub expiry_date: Option<String>,
    pub premium_breakdown: PremiumBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub error: String,
    pub error_details: ErrorDetails,
}

impl From<&RateError> for FailureReport {
    fn from(err: &RateError) -> Self {
        let message = err.to_string();
        Self {
            error: message.clone(),
            error_details: ErrorDetails {
                kind: err.kind(),
                message,
                stage: err.stage(),
                missing_fields: err.missing_fields().to_vec(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RatingResult {
    Success(Quote),
    Failure(FailureReport),
}

impl RatingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RatingResult::Success(_))
    }

    pub fn quote(&self) -> Option<&Quote> {
        match self {
            RatingResult::Success(quote) => Some(quote),
            RatingResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReport> {
        match self {
            RatingResult::Success(_) => None,
            RatingResult::Failure(report) => Some(report),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        // 兩種變體的欄位都是已知型別，序列化不會失敗
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({ "success": self.is_success() }))
    }
}

#[derive(Serialize)]
struct Flagged<'a, T: Serialize> {
    success: bool,
    #[serde(flatten)]
    body: &'a T,
}

impl Serialize for RatingResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RatingResult::Success(quote) => Flagged {
                success: true,
                body: quote,
            }
            .serialize(serializer),
            RatingResult::Failure(report) => Flagged {
                success: false,
                body: report,
            }
            .serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults_from_sparse_json() {
        let request: RatingRequest = serde_json::from_value(json!({
            "customerName": "Sweet Dreams Bakery LLC",
            "address1": "123 Main Street",
            "city": "Houston",
            "state": "TX",
            "zipCode": "77001"
        }))
        .unwrap();

        assert_eq!(request.business_type, BusinessType::Retail);
        assert_eq!(request.naics_code, "311811");
        assert_eq!(request.naics_definition, "Retail Bakeries");
        assert_eq!(request.legal_structure, LegalStructure::Llc);
        assert_eq!(request.full_time_empl, 5);
        assert_eq!(request.part_time_empl, 0);
        assert_eq!(request.building_limit, 500_000);
        assert_eq!(request.bpp_limit, 100_000);
        assert_eq!(request.each_occurrence_limit.as_str(), "1,000,000 CSL");
        assert_eq!(request.general_aggregate_limit.as_str(), "2,000,000 CSL");
        assert_eq!(request.post_code(), "77001");
        assert_eq!(request.customer_no(), "CO00000001");
        assert!(request.validate_fields().is_ok());
    }

    #[test]
    fn test_request_parses_overrides_and_credentials() {
        let request: RatingRequest = serde_json::from_value(json!({
            "customerName": "TechParts Manufacturing Inc",
            "address1": "456 Industrial Blvd",
            "city": "Dallas",
            "state": "TX",
            "zipCode": "75201",
            "businessType": "Manufacturing",
            "legalStructure": "Corporation",
            "fullTimeEmpl": 25,
            "eachOccurrenceLimit": "2,000,000 CSL",
            "generalAggregateLimit": "4,000,000 CSL",
            "api_token": "override-token",
            "base_url": "https://rating.example.com"
        }))
        .unwrap();

        assert_eq!(request.business_type, BusinessType::Manufacturing);
        assert_eq!(request.legal_structure, LegalStructure::Corporation);
        assert_eq!(request.full_time_empl, 25);
        assert_eq!(request.each_occurrence_limit, EachOccurrenceLimit::TwoMillion);
        assert_eq!(request.general_aggregate_limit, GeneralAggregateLimit::FourMillion);
        assert_eq!(request.credentials.api_token.as_deref(), Some("override-token"));
        assert_eq!(
            request.credentials.base_url.as_deref(),
            Some("https://rating.example.com")
        );
    }

    #[test]
    fn test_request_rejects_values_outside_enumerations() {
        let parsed: std::result::Result<RatingRequest, _> = serde_json::from_value(json!({
            "eachOccurrenceLimit": "3,000,000 CSL"
        }));
        assert!(parsed.is_err());

        let parsed: std::result::Result<RatingRequest, _> = serde_json::from_value(json!({
            "fullTimeEmpl": -1
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_validate_fields_lists_exactly_missing() {
        let request = RatingRequest {
            customer_name: Some("Acme".to_string()),
            city: Some(String::new()),
            state: Some("TX".to_string()),
            ..RatingRequest::default()
        };

        let err = request.validate_fields().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(err.missing_fields(), ["address1", "city", "zipCode"]);
    }

    #[test]
    fn test_validate_fields_checks_formats() {
        let request = RatingRequest::new("Acme", "1 Road", "Austin", "Texas", "78701");
        assert!(matches!(
            request.validate_fields(),
            Err(RateError::InvalidFieldError { ref field, .. }) if field == "state"
        ));

        let request = RatingRequest::new("Acme", "1 Road", "Austin", "TX", "787");
        assert!(matches!(
            request.validate_fields(),
            Err(RateError::InvalidFieldError { ref field, .. }) if field == "zipCode"
        ));
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!("llc".parse::<LegalStructure>().unwrap(), LegalStructure::Llc);
        assert_eq!(
            "10,000,000 CSL".parse::<GeneralAggregateLimit>().unwrap(),
            GeneralAggregateLimit::TenMillion
        );
        assert!("Farming".parse::<BusinessType>().is_err());
    }

    #[test]
    fn test_failure_result_json_shape() {
        let err = RateError::MissingFieldsError {
            missing_fields: vec!["zipCode".to_string()],
        };
        let result = RatingResult::Failure(FailureReport::from(&err));

        assert_eq!(
            result.to_json(),
            json!({
                "success": false,
                "error": "Missing required fields: zipCode",
                "errorDetails": {
                    "type": "ValidationError",
                    "message": "Missing required fields: zipCode",
                    "missingFields": ["zipCode"]
                }
            })
        );
    }
}
