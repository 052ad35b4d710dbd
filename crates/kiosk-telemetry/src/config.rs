//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name stamped on the startup log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether to colour console output
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "notouch-kiosk".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// - `KIOSK_SERVICE_NAME`: Service name (default: notouch-kiosk)
    /// - `KIOSK_LOG_LEVEL`: Log level (default: info)
    /// - `KIOSK_JSON_LOGS`: JSON logs (default: false, true under journald)
    /// - `KIOSK_NO_COLOR`: Disable ANSI colours (default: off under journald)
    pub fn from_env() -> Self {
        // systemd sets this when stdout is connected to the journal.
        let under_journald = env::var("JOURNAL_STREAM").is_ok();

        Self {
            service_name: env::var("KIOSK_SERVICE_NAME")
                .unwrap_or_else(|_| "notouch-kiosk".to_string()),

            log_level: env::var("KIOSK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("KIOSK_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(under_journald),

            ansi: env::var("KIOSK_NO_COLOR")
                .map(|v| !parse_flag(&v))
                .unwrap_or(!under_journald),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "notouch-kiosk");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("no"));
    }
}
