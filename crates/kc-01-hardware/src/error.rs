//! Error types for the hardware subsystem

use std::time::Duration;

use thiserror::Error;

/// Hardware subsystem errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HardwareError {
    /// None of the scale reads produced a parseable weight
    #[error("No valid weight sample in {attempts} read attempts")]
    NoValidSample { attempts: u32 },

    /// The scale's serial port could not be opened
    #[error("Serial port {port} unavailable: {reason}")]
    SerialUnavailable { port: String, reason: String },

    /// Nobody presented a tag before the wait timed out
    #[error("No tag presented within {waited:?}")]
    TagNotPresented { waited: Duration },

    /// No proximity reader is attached or the driver is missing
    #[error("Tag reader unavailable: {reason}")]
    HardwareUnavailable { reason: String },

    /// Transient card communication failure; the reader keeps polling
    #[error("Card read failed: {reason}")]
    CardRead { reason: String },
}

/// Result type for hardware operations
pub type HardwareResult<T> = Result<T, HardwareError>;
