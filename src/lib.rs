pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{ApiCredentials, ClientOptions, RatingClient, RetryPolicy};
pub use app::formatters::{AgentSummaryFormatter, RawFormatter, ResponseFormat};
pub use config::{ApiSettings, RaterConfig};
pub use core::{orchestrator::RatingOrchestrator, payload::PayloadBuilder};
pub use domain::document::PolicyDocument;
pub use domain::model::{FailureReport, Quote, RatingRequest, RatingResult};
pub use utils::error::{ErrorKind, RateError, Result};
