//! Fixture wiring a kiosk to in-memory stores and scripted devices.
//!
//! Shared by this crate's unit tests, the gateway's tests and the
//! end-to-end suite. Seeds two users:
//!
//! | UID | Name | Company | Code | Opening total |
//! |-----|------|---------|------|---------------|
//! | `UID1` | Kim | Acme | 8414 | 40.00 |
//! | `UID2` | Lee | Beta | 0012 | 5.00 |

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kc_01_hardware::adapters::testing::{RecordingActuator, ScriptedTagSource, ScriptedWeightSource};
use kc_01_hardware::{HardwareResult, WeightSource};
use kc_02_ledger::{
    InMemoryAggregateStore, InMemoryUserDirectory, LedgerResult, WeightLedger, WeightLedgerApi,
};
use parking_lot::{Condvar, Mutex};
use shared_bus::{EventPublisher, FailingPublisher, RecordingPublisher};
use shared_types::{
    AssignmentCode, LockState, ManualTimeSource, TimeSource, Uid, User, Weight, WeightAggregate,
};

use crate::context::{KioskContext, KioskPorts};
use crate::domain::{PhaseName, SessionConfig};
use crate::service::DisposalStateMachine;

/// A weight source that blocks until the test releases a reading.
#[derive(Debug, Default)]
pub struct WeightGate {
    slot: Mutex<Option<HardwareResult<Weight>>>,
    ready: Condvar,
}

impl WeightGate {
    pub fn release(&self, result: HardwareResult<Weight>) {
        *self.slot.lock() = Some(result);
        self.ready.notify_all();
    }
}

impl WeightSource for WeightGate {
    fn sample(&self) -> HardwareResult<Weight> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(result) = slot.take() {
                return result;
            }
            self.ready.wait(&mut slot);
        }
    }
}

/// A ledger whose writes block until the test opens it.
pub struct LedgerGate {
    inner: Arc<dyn WeightLedgerApi>,
    open: Mutex<bool>,
    ready: Condvar,
    held: AtomicBool,
}

impl LedgerGate {
    fn new(inner: Arc<dyn WeightLedgerApi>, open: bool) -> Self {
        Self {
            inner,
            open: Mutex::new(open),
            ready: Condvar::new(),
            held: AtomicBool::new(false),
        }
    }

    pub fn open(&self) {
        *self.open.lock() = true;
        self.ready.notify_all();
    }

    /// Poll until a write is parked at the gate, for up to two seconds.
    pub async fn wait_until_held(&self) {
        for _ in 0..400 {
            if self.held.load(Ordering::SeqCst) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("no ledger write reached the gate");
    }
}

impl WeightLedgerApi for LedgerGate {
    fn get(&self, code: AssignmentCode) -> LedgerResult<Weight> {
        self.inner.get(code)
    }

    fn apply_delta(
        &self,
        code: AssignmentCode,
        company: &str,
        delta: Weight,
    ) -> LedgerResult<Weight> {
        let mut open = self.open.lock();
        while !*open {
            self.held.store(true, Ordering::SeqCst);
            self.ready.wait(&mut open);
        }
        drop(open);
        self.inner.apply_delta(code, company, delta)
    }

    fn company_codes(&self, company: &str) -> LedgerResult<Vec<AssignmentCode>> {
        self.inner.company_codes(company)
    }
}

pub struct KioskHarness {
    pub ctx: Arc<KioskContext>,
    pub machine: Arc<DisposalStateMachine>,
    pub clock: Arc<ManualTimeSource>,
    pub scale: Arc<ScriptedWeightSource>,
    pub gate: Arc<WeightGate>,
    pub ledger_gate: Arc<LedgerGate>,
    pub tags: Arc<ScriptedTagSource>,
    pub actuator: Arc<RecordingActuator>,
    pub users: Arc<InMemoryUserDirectory>,
    pub aggregates: Arc<InMemoryAggregateStore>,
    pub publisher: Arc<RecordingPublisher>,
}

impl KioskHarness {
    /// Scripted scale, recording publisher.
    pub fn new() -> Self {
        Self::build(Gates::default(), None)
    }

    /// Every publish fails.
    pub fn with_failing_publisher() -> Self {
        Self::build(Gates::default(), Some(Arc::new(FailingPublisher::new())))
    }

    /// Scale samples block on [`WeightGate::release`].
    pub fn with_gated_scale() -> Self {
        Self::build(
            Gates {
                scale: true,
                ledger: false,
            },
            None,
        )
    }

    /// Ledger writes block on [`LedgerGate::open`].
    pub fn with_gated_ledger() -> Self {
        Self::build(
            Gates {
                scale: false,
                ledger: true,
            },
            None,
        )
    }

    fn build(gates: Gates, publisher: Option<Arc<dyn EventPublisher>>) -> Self {
        let clock = Arc::new(ManualTimeSource::default());
        let scale = Arc::new(ScriptedWeightSource::new());
        let gate = Arc::new(WeightGate::default());
        let tags = Arc::new(ScriptedTagSource::new());
        let actuator = Arc::new(RecordingActuator::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let aggregates = Arc::new(InMemoryAggregateStore::new());
        let recorder = Arc::new(RecordingPublisher::new());

        let ledger_gate = Arc::new(LedgerGate::new(
            Arc::new(WeightLedger::new(aggregates.clone())),
            !gates.ledger,
        ));

        let harness_scale: Arc<dyn WeightSource> = if gates.scale {
            gate.clone()
        } else {
            scale.clone()
        };
        let ports = KioskPorts {
            tags: tags.clone(),
            scale: harness_scale,
            users: users.clone(),
            ledger: ledger_gate.clone(),
            publisher: publisher.unwrap_or_else(|| recorder.clone() as Arc<dyn EventPublisher>),
            clock: clock.clone(),
            actuator: actuator.clone(),
        };
        let ctx = KioskContext::new(ports, SessionConfig::default());
        let machine = Arc::new(DisposalStateMachine::new(ctx.clone()));

        let harness = Self {
            ctx,
            machine,
            clock,
            scale,
            gate,
            ledger_gate,
            tags,
            actuator,
            users,
            aggregates,
            publisher: recorder,
        };
        harness.add_user("UID1", "Kim", "Acme", 8414);
        harness.add_aggregate(8414, "Acme", "40.00");
        harness.add_user("UID2", "Lee", "Beta", 12);
        harness.add_aggregate(12, "Beta", "5.00");
        harness
    }

    pub fn add_user(&self, uid: &str, name: &str, company: &str, code: u32) {
        if let Ok(uid) = Uid::parse(uid) {
            self.users.insert(User {
                uid,
                name: name.to_string(),
                company: company.to_string(),
                assignment_code: AssignmentCode(code),
                department: "Unknown".to_string(),
            });
        }
    }

    pub fn add_aggregate(&self, code: u32, company: &str, total: &str) {
        self.aggregates.insert(WeightAggregate {
            assignment_code: AssignmentCode(code),
            company: company.to_string(),
            accumulated_weight: total.parse().unwrap_or(Weight::ZERO),
        });
    }

    pub fn lock_state(&self) -> LockState {
        self.ctx.interlock().lock.state()
    }

    pub fn clock_now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Poll until the kiosk reports `phase`, for up to two seconds.
    pub async fn wait_for_phase(&self, phase: PhaseName) {
        for _ in 0..400 {
            if self.ctx.status().phase == phase {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("kiosk never reached phase {phase:?}");
    }

    /// Poll until `count` events were published, for up to two seconds.
    pub async fn wait_for_events(&self, count: usize) {
        for _ in 0..400 {
            if self.publisher.events().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("fewer than {count} events published");
    }
}

#[derive(Default)]
struct Gates {
    scale: bool,
    ledger: bool,
}

impl Default for KioskHarness {
    fn default() -> Self {
        Self::new()
    }
}
