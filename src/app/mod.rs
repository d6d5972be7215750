pub mod formatters;

pub use formatters::{AgentSummaryFormatter, RawFormatter, ResponseFormat};
