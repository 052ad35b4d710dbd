//! Barrier relay on a Linux sysfs GPIO line.

use std::fs;
use std::path::{Path, PathBuf};

use shared_types::LockState;
use tracing::{error, info};

use crate::domain::LockConfig;
use crate::error::{HardwareError, HardwareResult};
use crate::ports::Actuator;

/// Relay driven through `/sys/class/gpio/gpio<N>/value`.
pub struct SysfsGpioActuator {
    pin: u32,
    active_high: bool,
    value_path: PathBuf,
}

impl SysfsGpioActuator {
    /// Export the pin if needed and configure it as an output.
    pub fn open(config: &LockConfig) -> HardwareResult<Self> {
        let pin_dir = config.sysfs_root.join(format!("gpio{}", config.gpio_pin));
        let unavailable = |reason: String| HardwareError::HardwareUnavailable { reason };

        if !pin_dir.exists() {
            write_attr(&config.sysfs_root.join("export"), &config.gpio_pin.to_string())
                .map_err(|e| unavailable(format!("export gpio{}: {e}", config.gpio_pin)))?;
        }
        write_attr(&pin_dir.join("direction"), "out")
            .map_err(|e| unavailable(format!("configure gpio{}: {e}", config.gpio_pin)))?;

        info!(pin = config.gpio_pin, active_high = config.active_high, "Lock GPIO ready");
        Ok(Self {
            pin: config.gpio_pin,
            active_high: config.active_high,
            value_path: pin_dir.join("value"),
        })
    }

    fn level(&self, state: LockState) -> &'static str {
        let energised = state == LockState::Unlocked;
        if energised == self.active_high {
            "1"
        } else {
            "0"
        }
    }
}

impl Actuator for SysfsGpioActuator {
    fn write(&self, state: LockState) {
        if let Err(e) = write_attr(&self.value_path, self.level(state)) {
            error!(pin = self.pin, state = %state, error = %e, "Lock GPIO write failed");
        }
    }
}

fn write_attr(path: &Path, value: &str) -> std::io::Result<()> {
    fs::write(path, value)
}
