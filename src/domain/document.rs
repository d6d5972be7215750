use crate::domain::model::PremiumBreakdown;
use crate::utils::error::{RateError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 與評價 API 往返的保單文件。
///
/// 內容對本 crate 而言是不透明的：create 回傳的文件會原封不動地送往
/// calculate，因此保留所有未知欄位。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyDocument(Map<String, Value>);

impl PolicyDocument {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// API 回應必須是 JSON 物件
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(RateError::InvalidResponse {
                message: format!("expected a JSON object, got {}", json_type_name(&other)),
            }),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 提案號碼；數字型態也接受，空字串與 0 視為不存在
    pub fn proposal_no(&self) -> Option<String> {
        match self.0.get("ProposalNo")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn policy_id(&self) -> Option<i64> {
        match self.0.get("PolicyId")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn number(&self, key: &str) -> f64 {
        self.0.get(key).map(as_number).unwrap_or(0.0)
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(Value::as_str).map(str::to_string)
    }

    /// 第一個 LOB 的第一個地點；結構不存在時回傳 None
    pub fn primary_location(&self) -> Option<&Map<String, Value>> {
        self.0
            .get("PolicyLobList")?
            .pointer("/0/PolicyRiskList/0")?
            .as_object()
    }

    /// 盡力而為的保費拆分：缺少的結構一律以 0 計
    pub fn premium_breakdown(&self) -> PremiumBreakdown {
        let mut breakdown = PremiumBreakdown {
            total_premium: self.number("TotalPremium"),
            gross_premium: self.number("GrossPremium"),
            ..PremiumBreakdown::default()
        };

        let Some(location) = self.primary_location() else {
            tracing::warn!("⚠️ Premium breakdown unavailable: no location in PolicyLobList[0]");
            return breakdown;
        };

        breakdown.gl_premium = location.get("XGLPremium").map(as_number).unwrap_or(0.0);
        breakdown.property_premium = location.get("XCFPremium").map(as_number).unwrap_or(0.0);

        let coverages = location
            .get("PolicyRiskList")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter(|risk| element_code(risk).is_some_and(|code| code.ends_with("CFBUILDING")))
            .filter_map(|building| building.get("PolicyCoverageList").and_then(Value::as_array))
            .flatten();

        for coverage in coverages {
            let premium = coverage.get("XPremium").map(as_number).unwrap_or(0.0);
            match element_code(coverage) {
                Some(code) if code.ends_with("BUILDINGCOVERAGE") => breakdown.building_premium += premium,
                Some(code) if code.ends_with("BPPCOVERAGE") => breakdown.bpp_premium += premium,
                Some(code) if code.ends_with("CFBUILDINGBIC") => breakdown.bi_premium += premium,
                _ => {}
            }
        }

        breakdown
    }
}

fn element_code(value: &Value) -> Option<&str> {
    value.get("ProductElementCode").and_then(Value::as_str)
}

/// 數值欄位可能以字串傳回（例如 "2500.00"）
fn as_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().replace(',', "").parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> PolicyDocument {
        PolicyDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_breakdown_from_first_location() {
        let doc = document(json!({
            "TotalPremium": 5234.00,
            "PolicyLobList": [{
                "PolicyRiskList": [{ "XGLPremium": 2500, "XCFPremium": 2734 }]
            }]
        }));

        let breakdown = doc.premium_breakdown();
        assert_eq!(breakdown.total_premium, 5234.0);
        assert_eq!(breakdown.gl_premium, 2500.0);
        assert_eq!(breakdown.property_premium, 2734.0);
        assert_eq!(breakdown.gross_premium, 0.0);
    }

    #[test]
    fn test_breakdown_defaults_to_zero_without_structure() {
        for value in [
            json!({ "TotalPremium": 100 }),
            json!({ "TotalPremium": 100, "PolicyLobList": [] }),
            json!({ "TotalPremium": 100, "PolicyLobList": [{ "PolicyRiskList": [] }] }),
            json!({ "TotalPremium": 100, "PolicyLobList": "unexpected" }),
        ] {
            let breakdown = document(value).premium_breakdown();
            assert_eq!(breakdown.total_premium, 100.0);
            assert_eq!(breakdown.gl_premium, 0.0);
            assert_eq!(breakdown.property_premium, 0.0);
        }
    }

    #[test]
    fn test_breakdown_reads_building_coverage_premiums() {
        let doc = document(json!({
            "PolicyLobList": [{
                "PolicyRiskList": [{
                    "XGLPremium": "1,200.50",
                    "PolicyRiskList": [
                        { "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONGLCLASSIFICATION" },
                        {
                            "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONCFBUILDING",
                            "PolicyCoverageList": [
                                { "XPremium": 900, "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONCFBUILDINGBUILDINGCOVERAGE" },
                                { "XPremium": 300, "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONCFBUILDINGBPPCOVERAGE" },
                                { "XPremium": 150, "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONCFBUILDINGBIC" },
                                { "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONCFBUILDINGSPOILAGECOVERAGE" }
                            ]
                        }
                    ]
                }]
            }]
        }));

        let breakdown = doc.premium_breakdown();
        assert_eq!(breakdown.gl_premium, 1200.5);
        assert_eq!(breakdown.building_premium, 900.0);
        assert_eq!(breakdown.bpp_premium, 300.0);
        assert_eq!(breakdown.bi_premium, 150.0);
    }

    #[test]
    fn test_proposal_no_and_policy_id() {
        let doc = document(json!({ "ProposalNo": "POCGL0001", "PolicyId": 42 }));
        assert_eq!(doc.proposal_no().as_deref(), Some("POCGL0001"));
        assert_eq!(doc.policy_id(), Some(42));

        let doc = document(json!({ "ProposalNo": "", "PolicyId": "77" }));
        assert_eq!(doc.proposal_no(), None);
        assert_eq!(doc.policy_id(), Some(77));

        assert_eq!(document(json!({})).proposal_no(), None);
    }

    #[test]
    fn test_zero_proposal_no_is_missing() {
        assert_eq!(document(json!({ "ProposalNo": 0 })).proposal_no(), None);
        assert_eq!(document(json!({ "ProposalNo": 0.0 })).proposal_no(), None);
        assert_eq!(
            document(json!({ "ProposalNo": 1001 })).proposal_no().as_deref(),
            Some("1001")
        );
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        let err = PolicyDocument::from_value(json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected API response: expected a JSON object, got array");
    }
}
