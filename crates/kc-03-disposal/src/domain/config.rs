//! Session timing.

use serde::{Deserialize, Serialize};

/// Longest session lifetime or reap threshold accepted from configuration.
pub const MAX_SESSION_MINUTES: i64 = 24 * 60;

/// Session lifetime and reaper schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session lifetime from creation.
    pub ttl_minutes: i64,
    /// Age past which the reaper clears a session.
    pub reap_after_minutes: i64,
    /// Reaper tick period.
    pub reap_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 32,
            reap_after_minutes: 30,
            reap_interval_secs: 60,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> chrono::Duration {
        bounded_minutes(self.ttl_minutes)
    }

    pub fn reap_after(&self) -> chrono::Duration {
        bounded_minutes(self.reap_after_minutes)
    }

    pub fn reap_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.reap_interval_secs)
    }
}

fn bounded_minutes(minutes: i64) -> chrono::Duration {
    chrono::Duration::minutes(minutes.clamp(0, MAX_SESSION_MINUTES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations_are_bounded() {
        let config = SessionConfig {
            ttl_minutes: i64::MAX,
            reap_after_minutes: i64::MIN,
            reap_interval_secs: 60,
        };
        assert_eq!(config.ttl(), chrono::Duration::minutes(MAX_SESSION_MINUTES));
        assert_eq!(config.reap_after(), chrono::Duration::zero());
        assert_eq!(SessionConfig::default().ttl(), chrono::Duration::minutes(32));
    }
}
