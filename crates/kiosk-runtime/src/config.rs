//! # Kiosk Configuration
//!
//! Unified configuration for every crate the kiosk wires together.
//!
//! Precedence, lowest to highest: built-in defaults, the TOML file given
//! with `--config`, `KIOSK_*` environment variables, the `--simulate` flag.
//!
//! ```toml
//! [http]
//! port = 8080
//!
//! [scale]
//! port = "/dev/ttyUSB0"
//!
//! [mqtt]
//! host = "broker.local"
//! topic = "kiosk/disposal"
//!
//! [storage]
//! path = "/var/lib/notouch/ledger.json"
//! ```

use std::path::{Path, PathBuf};

use kc_01_hardware::{LockConfig, ScaleConfig, TagReaderConfig};
use kc_03_disposal::{SessionConfig, MAX_SESSION_MINUTES};
use kc_04_api_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use shared_bus::MqttConfig;
use shared_types::{Uid, Weight};
use thiserror::Error;

/// Complete kiosk configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub http: GatewayConfig,
    pub session: SessionConfig,
    pub scale: ScaleConfig,
    pub tag_reader: TagReaderConfig,
    pub lock: LockConfig,
    pub mqtt: MqttConfig,
    pub storage: StorageConfig,
    pub hardware: HardwareConfig,
}

/// Ledger snapshot location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("kiosk-ledger.json"),
        }
    }
}

/// Device selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Replace every device with a stand-in and the broker with an
    /// in-process bus.
    pub simulate: bool,
    /// What the simulated scale reports.
    pub simulated_weight: Weight,
    /// Card resting on the simulated reader.
    pub simulated_tag: Option<Uid>,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cannot read {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    #[error("Cannot parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl KioskConfig {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text).map_err(|reason| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Apply `KIOSK_*` overrides read through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let env = EnvReader { lookup: &lookup };

        env.parse("KIOSK_HTTP_HOST", &mut self.http.host)?;
        env.parse("KIOSK_HTTP_PORT", &mut self.http.port)?;
        env.parse("KIOSK_SESSION_TTL_MINUTES", &mut self.session.ttl_minutes)?;
        env.parse("KIOSK_REAP_AFTER_MINUTES", &mut self.session.reap_after_minutes)?;
        env.parse("KIOSK_REAP_INTERVAL_SECS", &mut self.session.reap_interval_secs)?;
        env.parse("KIOSK_SCALE_PORT", &mut self.scale.port)?;
        env.parse("KIOSK_SCALE_BAUD", &mut self.scale.baud_rate)?;
        env.parse("KIOSK_LOCK_GPIO", &mut self.lock.gpio_pin)?;
        env.parse("KIOSK_MQTT_HOST", &mut self.mqtt.host)?;
        env.parse("KIOSK_MQTT_PORT", &mut self.mqtt.port)?;
        env.parse("KIOSK_MQTT_TOPIC", &mut self.mqtt.topic)?;
        env.parse("KIOSK_STORAGE_PATH", &mut self.storage.path)?;
        env.parse("KIOSK_SIMULATE", &mut self.hardware.simulate)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.http
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let session = &self.session;
        if session.ttl_minutes <= 0 || session.reap_after_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "session durations must be positive".into(),
            ));
        }
        if session.ttl_minutes > MAX_SESSION_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "ttl_minutes ({}) exceeds {MAX_SESSION_MINUTES}",
                session.ttl_minutes
            )));
        }
        if session.reap_after_minutes >= session.ttl_minutes {
            return Err(ConfigError::Invalid(format!(
                "reap_after_minutes ({}) must be below ttl_minutes ({})",
                session.reap_after_minutes, session.ttl_minutes
            )));
        }
        if session.reap_interval_secs == 0 {
            return Err(ConfigError::Invalid("reap_interval_secs cannot be 0".into()));
        }
        // An idle session must be reaped before it expires.
        let reaped_by = session
            .reap_after_minutes
            .saturating_mul(60)
            .saturating_add(i64::try_from(session.reap_interval_secs).unwrap_or(i64::MAX));
        if reaped_by >= session.ttl_minutes * 60 {
            return Err(ConfigError::Invalid(format!(
                "reap_after_minutes ({}) plus reap_interval_secs ({}) must end before ttl_minutes ({})",
                session.reap_after_minutes, session.reap_interval_secs, session.ttl_minutes
            )));
        }

        if self.scale.attempts == 0 || self.scale.baud_rate == 0 {
            return Err(ConfigError::Invalid(
                "scale attempts and baud_rate must be positive".into(),
            ));
        }
        if self.tag_reader.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms cannot be 0".into()));
        }
        if self.mqtt.publish_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "publish_timeout_secs cannot be 0".into(),
            ));
        }
        if self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage path is empty".into()));
        }
        Ok(())
    }
}

struct EnvReader<'a, F> {
    lookup: &'a F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<'_, F> {
    fn parse<T: std::str::FromStr>(&self, key: &str, slot: &mut T) -> Result<(), ConfigError> {
        let Some(value) = (self.lookup)(key) else {
            return Ok(());
        };
        *slot = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            key: key.to_string(),
            value,
        })?;
        Ok(())
    }
}
