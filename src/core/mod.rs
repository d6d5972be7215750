pub mod orchestrator;
pub mod payload;

pub use crate::domain::model::{Quote, RatingRequest, RatingResult};
pub use crate::domain::ports::{Clock, RatingApi, ResponseFormatter};
pub use crate::utils::error::Result;
pub use orchestrator::RatingOrchestrator;
pub use payload::PayloadBuilder;
