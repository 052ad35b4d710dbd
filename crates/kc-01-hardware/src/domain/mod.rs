//! Domain layer for the hardware subsystem

pub mod config;
pub mod weight_line;

pub use config::{LockConfig, ScaleConfig, TagReaderConfig};
pub use weight_line::parse_weight_line;
