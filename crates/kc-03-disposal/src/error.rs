//! Error types for the disposal subsystem
//!
//! Component errors from hardware, ledger and bus are folded into this one
//! taxonomy here and nowhere else.

use kc_01_hardware::HardwareError;
use kc_02_ledger::LedgerError;
use shared_bus::PublishError;
use shared_types::{AssignmentCode, Uid};
use thiserror::Error;

/// Disposal subsystem errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisposalError {
    /// The tag is not registered to any user
    #[error("No user registered for tag {uid}")]
    UserNotFound { uid: Uid },

    /// The tag does not belong to the active session, or the session has
    /// not been confirmed yet
    #[error("Tag mismatch: {detail}")]
    TagMismatch { detail: String },

    /// No session, or the session has expired
    #[error("No active session")]
    StaleOrMissingSession,

    /// The scale produced no parseable reading
    #[error("No valid weight sample in {attempts} attempts")]
    NoValidSample { attempts: u32 },

    /// The scale's serial port could not be opened
    #[error("Scale unavailable: {reason}")]
    SerialUnavailable { reason: String },

    /// No weight aggregate for the user's assignment code
    #[error("No weight aggregate for assignment code {code}")]
    CompanyNotFound { code: AssignmentCode },

    /// The delta could not be broadcast. Logged, never returned by finalize.
    #[error("Publish failed: {reason}")]
    PublishFailure { reason: String },

    /// The tag reader is missing
    #[error("Tag reader unavailable: {reason}")]
    HardwareUnavailable { reason: String },

    /// Another workflow holds the kiosk
    #[error("Kiosk busy: {reason}")]
    AlreadyActive { reason: String },

    /// No tag was presented before the reader gave up
    #[error("No tag presented")]
    TagNotPresented,

    /// The kiosk was reset while this request was in flight
    #[error("Request interrupted by a reset")]
    Interrupted,

    /// User or ledger storage failed
    #[error("Storage error: {reason}")]
    Storage { reason: String },

    /// A blocking worker died
    #[error("Internal error: {reason}")]
    Internal { reason: String },
}

impl DisposalError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound { .. } => "USER_NOT_FOUND",
            Self::TagMismatch { .. } => "TAG_MISMATCH",
            Self::StaleOrMissingSession => "STALE_OR_MISSING_SESSION",
            Self::NoValidSample { .. } => "NO_VALID_SAMPLE",
            Self::SerialUnavailable { .. } => "SERIAL_UNAVAILABLE",
            Self::CompanyNotFound { .. } => "COMPANY_NOT_FOUND",
            Self::PublishFailure { .. } => "PUBLISH_FAILURE",
            Self::HardwareUnavailable { .. } => "HARDWARE_UNAVAILABLE",
            Self::AlreadyActive { .. } => "ALREADY_ACTIVE",
            Self::TagNotPresented => "TAG_NOT_PRESENTED",
            Self::Interrupted => "INTERRUPTED",
            Self::Storage { .. } => "STORAGE",
            Self::Internal { .. } => "INTERNAL",
        }
    }

    pub(crate) fn tag_mismatch(detail: &str) -> Self {
        Self::TagMismatch {
            detail: detail.to_string(),
        }
    }

    pub(crate) fn busy(reason: &str) -> Self {
        Self::AlreadyActive {
            reason: reason.to_string(),
        }
    }
}

impl From<HardwareError> for DisposalError {
    fn from(e: HardwareError) -> Self {
        match e {
            HardwareError::NoValidSample { attempts } => Self::NoValidSample { attempts },
            HardwareError::SerialUnavailable { port, reason } => Self::SerialUnavailable {
                reason: format!("{port}: {reason}"),
            },
            HardwareError::TagNotPresented { .. } => Self::TagNotPresented,
            HardwareError::HardwareUnavailable { reason } | HardwareError::CardRead { reason } => {
                Self::HardwareUnavailable { reason }
            }
        }
    }
}

impl From<LedgerError> for DisposalError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::CompanyNotFound { code } => Self::CompanyNotFound { code },
            LedgerError::Storage { reason } => Self::Storage { reason },
        }
    }
}

impl From<PublishError> for DisposalError {
    fn from(e: PublishError) -> Self {
        Self::PublishFailure {
            reason: e.to_string(),
        }
    }
}

/// Result type for disposal operations
pub type DisposalResult<T> = Result<T, DisposalError>;
