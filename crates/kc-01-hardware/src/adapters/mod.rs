//! Adapters for the hardware ports.
//!
//! - `serial`: scale line over the `serialport` crate
//! - `gpio`: barrier relay via Linux sysfs
//! - `pcsc`: proximity reader over PC/SC (feature `pcsc`)
//! - `simulated`: stand-ins for running without devices
//! - `testing`: scripted fakes for unit and integration tests

pub mod gpio;
#[cfg(feature = "pcsc")]
pub mod pcsc;
pub mod serial;
pub mod simulated;
pub mod testing;

pub use gpio::SysfsGpioActuator;
#[cfg(feature = "pcsc")]
pub use pcsc::PcscCardProbe;
pub use serial::SerialportOpener;
pub use simulated::{SimulatedActuator, SimulatedCardProbe, SimulatedScale, UnavailableCardProbe};
