mod engine;
mod output;
mod sink;

use thiserror::Error;

pub use crate::engine::MappingEngine;
pub use crate::output::OutputState;
pub use crate::sink::{OutputSink, SinkReport};

/// Error type for output sink operations.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The virtual controller is not available.
    #[error("Virtual pad unavailable: {0}")]
    Unavailable(String),
    /// The driver rejected an output report.
    #[error("Report submission failed: {0}")]
    Submit(String),
}

/// Convenient result alias
pub type Result<T> = std::result::Result<T, SinkError>;
