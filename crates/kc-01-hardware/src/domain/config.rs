//! Device configuration.
//!
//! Defaults match the deployed kiosk: scale on `/dev/serial0` at 9600 baud,
//! barrier relay on GPIO 21 (active high).

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serial scale settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub port: String,
    pub baud_rate: u32,
    /// Per-read timeout.
    pub read_timeout_ms: u64,
    /// Line reads per measurement.
    pub attempts: u32,
    /// Unit token that must follow the number.
    pub unit: String,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            port: "/dev/serial0".to_string(),
            baud_rate: 9600,
            read_timeout_ms: 1000,
            attempts: 3,
            unit: "kg".to_string(),
        }
    }
}

impl ScaleConfig {
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Proximity reader polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagReaderConfig {
    pub poll_interval_ms: u64,
    pub wait_timeout_secs: u64,
}

impl Default for TagReaderConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            wait_timeout_secs: 30,
        }
    }
}

impl TagReaderConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

/// Barrier relay output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    pub gpio_pin: u32,
    /// When true, driving the pin high opens the barrier.
    pub active_high: bool,
    pub sysfs_root: PathBuf,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            gpio_pin: 21,
            active_high: true,
            sysfs_root: PathBuf::from("/sys/class/gpio"),
        }
    }
}
