use crate::app::formatters::ResponseFormat;
use crate::config::settings::ApiSettings;
use crate::config::toml_config::RaterConfig;
use crate::domain::model::{
    BusinessType, EachOccurrenceLimit, GeneralAggregateLimit, LegalStructure, RatingRequest,
};
use crate::utils::error::{RateError, Result};
use crate::utils::validation::Validate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "insuremo-rater")]
#[command(about = "Rate a commercial package policy (GL + property) against InsureMO")]
#[command(version)]
pub struct CliArgs {
    /// 以 JSON 檔提供完整請求；其餘旗標會覆寫檔案內的欄位
    #[arg(long, value_name = "FILE")]
    pub request: Option<PathBuf>,

    #[arg(long)]
    pub customer_name: Option<String>,

    #[arg(long)]
    pub address1: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long, help = "Two-letter state code, e.g. TX")]
    pub state: Option<String>,

    #[arg(long)]
    pub zip_code: Option<String>,

    #[arg(long)]
    pub business_type: Option<BusinessType>,

    #[arg(long)]
    pub naics_code: Option<String>,

    #[arg(long)]
    pub naics_definition: Option<String>,

    #[arg(long)]
    pub legal_structure: Option<LegalStructure>,

    #[arg(long)]
    pub full_time_empl: Option<u32>,

    #[arg(long)]
    pub part_time_empl: Option<u32>,

    #[arg(long)]
    pub building_limit: Option<u64>,

    #[arg(long)]
    pub bpp_limit: Option<u64>,

    #[arg(long, help = "1,000,000 CSL | 2,000,000 CSL | 5,000,000 CSL")]
    pub each_occurrence_limit: Option<EachOccurrenceLimit>,

    #[arg(long, help = "2,000,000 CSL | 4,000,000 CSL | 10,000,000 CSL")]
    pub general_aggregate_limit: Option<GeneralAggregateLimit>,

    /// TOML 設定檔 ([api] / [retry] / [output])
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Output format: raw | agent-summary")]
    pub format: Option<ResponseFormat>,

    #[arg(long, help = "Bearer token (falls back to INSUREMO_API_TOKEN)")]
    pub api_token: Option<String>,

    #[arg(long, help = "API base URL (falls back to INSUREMO_BASE_URL)")]
    pub base_url: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    /// 載入並驗證 `--config` 指定的 TOML
    pub fn load_config(&self) -> Result<Option<RaterConfig>> {
        let Some(path) = &self.config else {
            return Ok(None);
        };

        let config = RaterConfig::from_file(path).map_err(|e| match e {
            RateError::IoError(io) => RateError::ConfigError {
                message: format!("Cannot read config file {}: {}", path.display(), io),
            },
            other => other,
        })?;
        config.validate()?;
        Ok(Some(config))
    }

    /// 旗標 > TOML > 環境變數
    pub fn api_settings(&self, file: Option<&RaterConfig>) -> ApiSettings {
        let file_settings = file.map(RaterConfig::api_settings).unwrap_or_default();

        let flags = ApiSettings {
            base_url: self.base_url.clone(),
            api_token: self.api_token.clone(),
            options: file_settings.options.clone(),
        };

        flags.or(file_settings).or(ApiSettings::from_env())
    }

    pub fn output_format(&self, file: Option<&RaterConfig>) -> ResponseFormat {
        self.format
            .or_else(|| file.and_then(RaterConfig::output_format))
            .unwrap_or_default()
    }

    /// 從 `--request` 檔案起頭，再套用個別旗標
    pub fn rating_request(&self) -> Result<RatingRequest> {
        let mut request = match &self.request {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| RateError::ConfigError {
                    message: format!("Cannot read request file {}: {}", path.display(), e),
                })?;
                serde_json::from_str(&content).map_err(|e| RateError::ConfigError {
                    message: format!("Invalid request JSON in {}: {}", path.display(), e),
                })?
            }
            None => RatingRequest::default(),
        };

        overwrite(&mut request.customer_name, &self.customer_name);
        overwrite(&mut request.address1, &self.address1);
        overwrite(&mut request.city, &self.city);
        overwrite(&mut request.state, &self.state);
        overwrite(&mut request.zip_code, &self.zip_code);

        if let Some(business_type) = self.business_type {
            request.business_type = business_type;
        }
        if let Some(naics_code) = &self.naics_code {
            request.naics_code = naics_code.clone();
        }
        if let Some(naics_definition) = &self.naics_definition {
            request.naics_definition = naics_definition.clone();
        }
        if let Some(legal_structure) = self.legal_structure {
            request.legal_structure = legal_structure;
        }
        request.full_time_empl = self.full_time_empl.unwrap_or(request.full_time_empl);
        request.part_time_empl = self.part_time_empl.unwrap_or(request.part_time_empl);
        request.building_limit = self.building_limit.unwrap_or(request.building_limit);
        request.bpp_limit = self.bpp_limit.unwrap_or(request.bpp_limit);
        if let Some(limit) = self.each_occurrence_limit {
            request.each_occurrence_limit = limit;
        }
        if let Some(limit) = self.general_aggregate_limit {
            request.general_aggregate_limit = limit;
        }

        Ok(request)
    }
}

fn overwrite(target: &mut Option<String>, flag: &Option<String>) {
    if flag.is_some() {
        target.clone_from(flag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(args: &[&str]) -> CliArgs {
        let mut argv = vec!["insuremo-rater"];
        argv.extend_from_slice(args);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_build_request_with_defaults() {
        let args = parse(&[
            "--customer-name",
            "Sweet Dreams Bakery LLC",
            "--address1",
            "123 Main Street",
            "--city",
            "Houston",
            "--state",
            "TX",
            "--zip-code",
            "77001",
            "--each-occurrence-limit",
            "2,000,000 CSL",
            "--legal-structure",
            "corporation",
        ]);

        let request = args.rating_request().unwrap();
        assert!(request.validate_fields().is_ok());
        assert_eq!(request.full_time_empl, 5);
        assert_eq!(request.each_occurrence_limit, EachOccurrenceLimit::TwoMillion);
        assert_eq!(request.legal_structure, LegalStructure::Corporation);
    }

    #[test]
    fn test_invalid_enum_flag_is_rejected() {
        let result = CliArgs::try_parse_from(["insuremo-rater", "--business-type", "Farming"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_request_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"customerName":"From File","address1":"1 File St","city":"Austin","state":"TX","zipCode":"73301","fullTimeEmpl":9}"#,
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = parse(&["--request", &path, "--city", "Dallas"]);
        let request = args.rating_request().unwrap();

        assert_eq!(request.customer_name(), "From File");
        assert_eq!(request.city(), "Dallas");
        assert_eq!(request.full_time_empl, 9);
    }

    #[test]
    fn test_unreadable_request_file_is_config_error() {
        let args = parse(&["--request", "/nonexistent/request.json"]);
        let err = args.rating_request().unwrap_err();
        assert!(matches!(err, RateError::ConfigError { .. }));
    }

    #[test]
    fn test_flag_settings_take_precedence_over_file() {
        let config = RaterConfig::from_toml_str(
            "[api]\nbase_url = \"https://file.example.com\"\ntoken = \"file-token\"\ntimeout_seconds = 10\n\n[output]\nformat = \"agent-summary\"\n",
        )
        .unwrap();
        let args = parse(&["--api-token", "flag-token"]);

        let settings = args.api_settings(Some(&config));
        assert_eq!(settings.api_token.as_deref(), Some("flag-token"));
        assert_eq!(settings.base_url.as_deref(), Some("https://file.example.com"));
        assert_eq!(settings.options.timeout, std::time::Duration::from_secs(10));
        assert_eq!(args.output_format(Some(&config)), ResponseFormat::AgentSummary);

        let args = parse(&["--format", "raw"]);
        assert_eq!(args.output_format(Some(&config)), ResponseFormat::Raw);
    }
}
