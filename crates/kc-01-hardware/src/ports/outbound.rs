//! Device-level interfaces the hardware subsystem drives.
//!
//! Each has a real adapter under `adapters/` and a scripted fake for tests.

use std::io;

use shared_types::{LockState, Uid};

use crate::error::HardwareResult;

/// One open serial connection. Closed when dropped.
pub trait SerialLine: Send {
    /// Read bytes up to and including the next newline, or whatever
    /// arrived before the read timeout.
    fn read_line(&mut self) -> io::Result<Vec<u8>>;
}

/// Opens the scale's serial line on demand.
pub trait SerialOpener: Send + Sync {
    /// Fails with `SerialUnavailable` if the port cannot be opened.
    fn open(&self) -> HardwareResult<Box<dyn SerialLine>>;

    /// Device path, for logs and errors.
    fn port_name(&self) -> &str;
}

/// Single non-blocking look at the proximity reader.
pub trait CardProbe: Send + Sync {
    /// `Ok(None)` when no card is on the reader.
    ///
    /// `HardwareUnavailable` when there is no reader at all; `CardRead`
    /// for transient failures worth retrying.
    fn probe(&self) -> HardwareResult<Option<Uid>>;
}

/// Physical barrier output. There is no readback and no failure signal.
pub trait Actuator: Send + Sync {
    fn write(&self, state: LockState);
}
