//! Error types for the ledger subsystem

use shared_types::AssignmentCode;
use thiserror::Error;

/// Ledger subsystem errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// No aggregate row exists for the assignment code
    #[error("No weight aggregate for assignment code {code}")]
    CompanyNotFound { code: AssignmentCode },

    /// The backing store failed to read or write
    #[error("Storage error: {reason}")]
    Storage { reason: String },
}

impl LedgerError {
    pub(crate) fn storage(reason: impl std::fmt::Display) -> Self {
        Self::Storage {
            reason: reason.to_string(),
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
