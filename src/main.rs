use clap::Parser;
use insuremo_rater::utils::error::{ErrorKind, RateError};
use insuremo_rater::utils::logger;
use insuremo_rater::{CliArgs, RatingOrchestrator, RatingResult};

const EXIT_RATING_FAILED: i32 = 1;
const EXIT_CONFIG: i32 = 2;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("Starting insuremo-rater CLI");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", redacted(&args));
    }

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => exit_with_config_error(&e),
    };
    let request = match args.rating_request() {
        Ok(request) => request,
        Err(e) => exit_with_config_error(&e),
    };

    let settings = args.api_settings(config.as_ref());
    let format = args.output_format(config.as_ref());
    tracing::debug!("📋 Output format: {:?}", format);

    let orchestrator = RatingOrchestrator::new(settings);
    let result = orchestrator.rate(&request).await;
    let output = format.formatter().format(&result, &request);

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("❌ Cannot serialize result: {}", e);
            std::process::exit(EXIT_RATING_FAILED);
        }
    }

    if let RatingResult::Failure(report) = &result {
        eprintln!("💡 建議: {}", report.error_details.kind.recovery_suggestion());
        let exit_code = match report.error_details.kind {
            ErrorKind::ConfigError => EXIT_CONFIG,
            _ => EXIT_RATING_FAILED,
        };
        std::process::exit(exit_code);
    }
}

fn exit_with_config_error(e: &RateError) -> ! {
    tracing::error!("❌ Configuration failed: {}", e);
    eprintln!("❌ {}", e);
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    std::process::exit(EXIT_CONFIG);
}

fn redacted(args: &CliArgs) -> CliArgs {
    let mut args = args.clone();
    if args.api_token.is_some() {
        args.api_token = Some("***".to_string());
    }
    args
}
