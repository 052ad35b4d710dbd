//! # Error Types
//!
//! Errors raised while constructing shared value objects.

use thiserror::Error;

/// A value object could not be built from its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Tag identifiers must contain at least one non-blank character.
    #[error("Tag UID is empty")]
    EmptyUid,

    /// The input is not a decimal weight with at most two fraction digits.
    #[error("Invalid weight literal: {0}")]
    InvalidWeight(String),

    /// The input is not a non-negative integer assignment code.
    #[error("Invalid assignment code: {0}")]
    InvalidAssignmentCode(String),
}
