//! A kiosk assembled from the real sensor, reader and ledger adapters, with
//! only the byte-level device ends scripted.

use std::sync::Arc;

use kc_01_hardware::adapters::testing::{RecordingActuator, ScriptedRead, ScriptedSerialOpener};
use kc_01_hardware::{CardProbe, HardwareResult, ScaleConfig, ScaleSensor, TagReader, TagReaderConfig};
use kc_02_ledger::{AggregateStore, JsonFileStore, WeightLedger};
use kc_03_disposal::{DisposalStateMachine, KioskContext, KioskPorts, SessionConfig};
use parking_lot::Mutex;
use shared_bus::{EventPublisher, InMemoryEventBus};
use shared_types::{AssignmentCode, LockState, ManualTimeSource, Uid, User, Weight, WeightAggregate};
use tempfile::TempDir;

/// Reader slot a card can be laid on and lifted off again.
#[derive(Debug, Clone, Default)]
pub struct CardSlot {
    card: Arc<Mutex<Option<Uid>>>,
}

impl CardSlot {
    pub fn present(&self, uid: &str) {
        *self.card.lock() = Uid::parse(uid).ok();
    }

    pub fn lift(&self) {
        *self.card.lock() = None;
    }
}

impl CardProbe for CardSlot {
    fn probe(&self) -> HardwareResult<Option<Uid>> {
        Ok(self.card.lock().clone())
    }
}

pub struct DeviceKiosk {
    pub ctx: Arc<KioskContext>,
    pub machine: Arc<DisposalStateMachine>,
    pub serial: ScriptedSerialOpener,
    pub card: CardSlot,
    pub actuator: Arc<RecordingActuator>,
    pub store: Arc<JsonFileStore>,
    pub bus: Arc<InMemoryEventBus>,
    pub clock: Arc<ManualTimeSource>,
    dir: TempDir,
}

impl DeviceKiosk {
    /// Kiosk with Kim (Acme, 8414, 40.00 kg booked) registered.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(
            JsonFileStore::open(dir.path().join("ledger.json")).expect("fresh ledger file"),
        );
        Self::assemble(dir, store)
    }

    /// A second kiosk process over the same ledger file.
    pub fn reopen(self) -> Self {
        let path = self.store.path().to_path_buf();
        let dir = self.dir;
        let store = Arc::new(JsonFileStore::open(path).expect("existing ledger file"));
        Self::assemble_with(dir, store, false)
    }

    fn assemble(dir: TempDir, store: Arc<JsonFileStore>) -> Self {
        Self::assemble_with(dir, store, true)
    }

    fn assemble_with(dir: TempDir, store: Arc<JsonFileStore>, seed: bool) -> Self {
        let serial = ScriptedSerialOpener::new(Vec::new());
        let card = CardSlot::default();
        let actuator = Arc::new(RecordingActuator::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let clock = Arc::new(ManualTimeSource::default());

        let reader_config = TagReaderConfig {
            poll_interval_ms: 1,
            wait_timeout_secs: 0,
        };
        let ports = KioskPorts {
            tags: Arc::new(TagReader::new(card.clone(), reader_config)),
            scale: Arc::new(ScaleSensor::new(serial.clone(), ScaleConfig::default())),
            users: store.clone(),
            ledger: Arc::new(WeightLedger::new(store.clone())),
            publisher: bus.clone() as Arc<dyn EventPublisher>,
            clock: clock.clone(),
            actuator: actuator.clone(),
        };
        let ctx = KioskContext::new(ports, SessionConfig::default());
        let machine = Arc::new(DisposalStateMachine::new(ctx.clone()));

        let kiosk = Self {
            ctx,
            machine,
            serial,
            card,
            actuator,
            store,
            bus,
            clock,
            dir,
        };
        if seed {
            kiosk.register("DF 79 1A 82", "Kim", "Acme", 8414);
            kiosk.book(8414, "Acme", "40.00");
        }
        kiosk
    }

    pub fn register(&self, uid: &str, name: &str, company: &str, code: u32) {
        let user = User {
            uid: Uid::parse(uid).expect("uid"),
            name: name.to_string(),
            company: company.to_string(),
            assignment_code: AssignmentCode(code),
            department: "Facilities".to_string(),
        };
        self.store.upsert_user(user).expect("user written");
    }

    pub fn book(&self, code: u32, company: &str, total: &str) {
        let row = WeightAggregate {
            assignment_code: AssignmentCode(code),
            company: company.to_string(),
            accumulated_weight: total.parse().expect("weight"),
        };
        self.store.store(&row).expect("aggregate written");
    }

    pub fn total(&self, code: u32) -> Option<Weight> {
        self.store
            .load(AssignmentCode(code))
            .expect("ledger readable")
            .map(|row| row.accumulated_weight)
    }

    /// Queue one measurement's worth of indicator lines.
    pub fn scale_lines(&self, lines: &[&str]) {
        for line in lines {
            self.serial.push(ScriptedRead::line(line));
        }
    }

    /// Queue a steady reading of `kg`, one line per attempt.
    pub fn scale_reads(&self, kg: &str) {
        let line = format!("ST,GS,  {kg} kg");
        self.scale_lines(&[&line, &line, &line]);
    }

    pub fn lock_state(&self) -> LockState {
        self.ctx.status().lock
    }

    pub fn uid(raw: &str) -> Uid {
        Uid::parse(raw).expect("uid")
    }
}

impl Default for DeviceKiosk {
    fn default() -> Self {
        Self::new()
    }
}
