//! # Kiosk Telemetry
//!
//! Observability for the disposal kiosk.
//!
//! - **Logs**: `tracing` events rendered by a `tracing-subscriber` fmt layer,
//!   pretty on a console, JSON when shipped to a log collector.
//! - **Metrics**: Prometheus counters on a crate-wide registry, served as text
//!   by the gateway's `/metrics` route.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kiosk_telemetry::{init_logging, register_metrics, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! register_metrics()?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUST_LOG` | unset | Full `EnvFilter` directive, wins over the level below |
//! | `KIOSK_LOG_LEVEL` | `info` | Log level filter |
//! | `KIOSK_JSON_LOGS` | `false` (`true` under journald) | JSON log lines |
//! | `KIOSK_SERVICE_NAME` | `notouch-kiosk` | Service name stamped on startup log |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, ACTUATOR_WRITES, PUBLISH_FAILURES, SCALE_SAMPLES,
    SESSIONS_COMPLETED, SESSIONS_REAPED, SESSIONS_STARTED, TRANSITION_FAILURES,
};

use thiserror::Error;

/// Telemetry initialisation errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
