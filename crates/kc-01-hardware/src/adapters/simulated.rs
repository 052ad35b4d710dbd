//! Stand-ins used when the kiosk runs without its devices.

use parking_lot::Mutex;
use shared_types::{LockState, Uid, Weight};
use tracing::{debug, info};

use crate::error::{HardwareError, HardwareResult};
use crate::ports::{Actuator, CardProbe, WeightSource};

/// Scale that reports whatever weight it was last set to.
#[derive(Debug)]
pub struct SimulatedScale {
    weight: Mutex<Weight>,
}

impl SimulatedScale {
    pub fn new(initial: Weight) -> Self {
        Self {
            weight: Mutex::new(initial.clamp_non_negative()),
        }
    }

    pub fn set(&self, weight: Weight) {
        *self.weight.lock() = weight.clamp_non_negative();
    }

    pub fn add(&self, delta: Weight) {
        let mut weight = self.weight.lock();
        *weight = (*weight + delta).clamp_non_negative();
    }
}

impl WeightSource for SimulatedScale {
    fn sample(&self) -> HardwareResult<Weight> {
        let weight = *self.weight.lock();
        debug!(weight = %weight, "Simulated scale sampled");
        Ok(weight)
    }
}

/// Reader with a card permanently resting on it, until removed.
#[derive(Debug, Default)]
pub struct SimulatedCardProbe {
    card: Mutex<Option<Uid>>,
}

impl SimulatedCardProbe {
    pub fn new(card: Option<Uid>) -> Self {
        Self {
            card: Mutex::new(card),
        }
    }

    pub fn present(&self, uid: Uid) {
        *self.card.lock() = Some(uid);
    }

    pub fn remove(&self) {
        *self.card.lock() = None;
    }
}

impl CardProbe for SimulatedCardProbe {
    fn probe(&self) -> HardwareResult<Option<Uid>> {
        Ok(self.card.lock().clone())
    }
}

/// Probe for builds without a reader driver.
#[derive(Debug, Default)]
pub struct UnavailableCardProbe;

impl CardProbe for UnavailableCardProbe {
    fn probe(&self) -> HardwareResult<Option<Uid>> {
        Err(HardwareError::HardwareUnavailable {
            reason: "built without PC/SC support".to_string(),
        })
    }
}

/// Barrier output with no relay behind it; writes are logged.
#[derive(Debug)]
pub struct SimulatedActuator {
    state: Mutex<LockState>,
}

impl SimulatedActuator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LockState::Locked),
        }
    }

    pub fn state(&self) -> LockState {
        *self.state.lock()
    }
}

impl Default for SimulatedActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuator for SimulatedActuator {
    fn write(&self, state: LockState) {
        *self.state.lock() = state;
        info!(state = %state, "Simulated barrier output");
    }
}
