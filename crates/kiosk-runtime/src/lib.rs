//! # NoTouch Kiosk Runtime
//!
//! Wires the kiosk crates into one process.
//!
//! ## Modular Structure
//!
//! - `config` - `KioskConfig`: TOML file, `KIOSK_*` overrides, validation
//! - `container` - device, store and bus selection, disposal core wiring
//! - `runtime` - reaper and HTTP server lifecycle, graceful shutdown

pub mod config;
pub mod container;
pub mod runtime;

pub use config::{ConfigError, HardwareConfig, KioskConfig, StorageConfig};
pub use container::{ContainerError, KioskContainer};
pub use runtime::{KioskRuntime, RuntimeError};
