//! Publishing errors.

use std::time::Duration;

use thiserror::Error;

/// A disposal event could not be delivered. Never fatal to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublishError {
    /// The event could not be encoded as JSON.
    #[error("Failed to encode disposal event: {0}")]
    Encode(String),

    /// The broker client rejected the publish request.
    #[error("Broker client rejected publish: {0}")]
    Client(String),

    /// The broker did not acknowledge within the publish budget.
    #[error("Publish not acknowledged within {after:?} (last error: {last_error})")]
    Timeout {
        after: Duration,
        last_error: String,
    },
}

/// Result type for publishing operations.
pub type PublishResult<T> = Result<T, PublishError>;
