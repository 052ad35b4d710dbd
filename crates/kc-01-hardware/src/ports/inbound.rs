//! Capabilities the hardware subsystem offers to the disposal core.
//!
//! Both calls block the calling thread for as long as the device needs;
//! async callers are expected to run them on a blocking worker.

use shared_types::{Uid, Weight};

use crate::error::HardwareResult;

/// Source of tag identifiers.
pub trait TagSource: Send + Sync {
    /// Wait for a tag and return its UID.
    fn read_tag(&self) -> HardwareResult<Uid>;
}

/// Source of averaged weight measurements.
pub trait WeightSource: Send + Sync {
    /// Take one measurement. Never negative.
    fn sample(&self) -> HardwareResult<Weight>;
}
