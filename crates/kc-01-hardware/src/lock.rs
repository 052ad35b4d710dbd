//! # Lock Actuator
//!
//! `lock()` and `unlock()` always drive the output, even when the commanded
//! state is unchanged, because the relay has no readback. Idempotence holds
//! at the API level only.

use std::sync::Arc;

use kiosk_telemetry::metrics::ACTUATOR_WRITES;
use shared_types::LockState;
use tracing::{debug, info};

use crate::ports::Actuator;

/// Commanded barrier state plus the output that realises it.
pub struct LockActuator {
    output: Arc<dyn Actuator>,
    state: LockState,
}

impl LockActuator {
    /// Drives the output to `Locked` immediately.
    pub fn new(output: Arc<dyn Actuator>) -> Self {
        let mut actuator = Self {
            output,
            state: LockState::Locked,
        };
        actuator.drive(LockState::Locked);
        actuator
    }

    pub fn lock(&mut self) {
        self.drive(LockState::Locked);
    }

    pub fn unlock(&mut self) {
        self.drive(LockState::Unlocked);
    }

    #[must_use]
    pub fn state(&self) -> LockState {
        self.state
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }

    fn drive(&mut self, state: LockState) {
        self.output.write(state);
        ACTUATOR_WRITES.with_label_values(&[state.as_str()]).inc();

        if self.state == state {
            debug!(state = %state, "Lock output refreshed");
        } else {
            info!(from = %self.state, to = %state, "Lock state changed");
        }
        self.state = state;
    }
}
