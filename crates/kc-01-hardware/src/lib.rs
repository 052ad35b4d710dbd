//! # kc-01-hardware
//!
//! The kiosk's three physical devices behind capability ports.
//!
//! ## Overview
//!
//! - **TagReader**: blocking, retrying UID acquisition from a proximity reader
//! - **ScaleSensor**: serial weight sampling with averaging and retry
//! - **LockActuator**: single binary barrier output, always written
//!
//! ## Architecture
//!
//! ```text
//!                       ┌──────────── kc-01-hardware ─────────────┐
//! Disposal core ──→ TagSource    ←── TagReader   ──→ CardProbe    ──→ PC/SC
//!               ──→ WeightSource ←── ScaleSensor ──→ SerialOpener ──→ /dev/serial0
//!               ──→ LockActuator ──────────────────→ Actuator     ──→ sysfs GPIO
//!                       └─────────────────────────────────────────┘
//! ```
//!
//! Every device call blocks. Nothing here spawns threads or touches an
//! async runtime.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod lock;
pub mod ports;
pub mod scale;
pub mod tag_reader;

pub use domain::{parse_weight_line, LockConfig, ScaleConfig, TagReaderConfig};
pub use error::{HardwareError, HardwareResult};
pub use lock::LockActuator;
pub use ports::{Actuator, CardProbe, SerialLine, SerialOpener, TagSource, WeightSource};
pub use scale::ScaleSensor;
pub use tag_reader::TagReader;
