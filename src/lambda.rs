#[cfg(feature = "lambda")]
use insuremo_rater::app::formatters::ResponseFormat;
#[cfg(feature = "lambda")]
use insuremo_rater::utils::logger;
#[cfg(feature = "lambda")]
use insuremo_rater::{ApiSettings, RatingOrchestrator, RatingRequest};
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde::Deserialize;
#[cfg(feature = "lambda")]
use std::sync::Arc;

/// 事件本體就是評價請求，另可指定輸出格式
#[cfg(feature = "lambda")]
#[derive(Deserialize)]
pub struct Request {
    #[serde(default)]
    pub format: Option<ResponseFormat>,
    #[serde(flatten)]
    pub rating: RatingRequest,
}

#[cfg(feature = "lambda")]
async fn function_handler(
    orchestrator: &RatingOrchestrator,
    event: LambdaEvent<Request>,
) -> Result<serde_json::Value, Error> {
    let Request { format, rating } = event.payload;
    tracing::info!(
        "Rating request {} for {}",
        event.context.request_id,
        rating.customer_name()
    );

    let formatter = format.unwrap_or_default().formatter();
    let output = orchestrator.rate_formatted(&rating, formatter.as_ref()).await;

    tracing::info!("Rating Lambda function completed");
    Ok(output)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // 憑證來自環境變數，事件可逐次覆寫
    let orchestrator = Arc::new(RatingOrchestrator::new(ApiSettings::from_env()));

    run(service_fn(move |event: LambdaEvent<Request>| {
        let orchestrator = Arc::clone(&orchestrator);
        async move { function_handler(&orchestrator, event).await }
    }))
    .await
}
