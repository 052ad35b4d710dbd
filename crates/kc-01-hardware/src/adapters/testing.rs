//! Scripted fakes for the hardware ports.
//!
//! Public so that the disposal and integration tests can compose them.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use shared_types::{LockState, Uid, Weight};

use crate::error::{HardwareError, HardwareResult};
use crate::ports::{Actuator, CardProbe, SerialLine, SerialOpener, TagSource, WeightSource};

// =============================================================================
// ACTUATOR
// =============================================================================

/// Remembers every state written to it.
#[derive(Debug, Default)]
pub struct RecordingActuator {
    writes: Mutex<Vec<LockState>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<LockState> {
        self.writes.lock().clone()
    }

    /// Level currently on the output, if anything was written.
    pub fn last(&self) -> Option<LockState> {
        self.writes.lock().last().copied()
    }
}

impl Actuator for RecordingActuator {
    fn write(&self, state: LockState) {
        self.writes.lock().push(state);
    }
}

// =============================================================================
// SERIAL LINE
// =============================================================================

/// One scripted read.
#[derive(Debug, Clone)]
pub enum ScriptedRead {
    Line(Vec<u8>),
    TimedOut,
}

impl ScriptedRead {
    pub fn line(text: &str) -> Self {
        Self::Line(format!("{text}\r\n").into_bytes())
    }
}

/// Serial opener replaying a shared script of reads across opens.
///
/// Reads past the end of the script time out.
#[derive(Debug, Clone)]
pub struct ScriptedSerialOpener {
    script: Arc<Mutex<VecDeque<ScriptedRead>>>,
    available: bool,
    opens: Arc<AtomicUsize>,
    open_handles: Arc<AtomicUsize>,
}

impl ScriptedSerialOpener {
    pub fn new(reads: Vec<ScriptedRead>) -> Self {
        Self {
            script: Arc::new(Mutex::new(reads.into())),
            available: true,
            opens: Arc::new(AtomicUsize::new(0)),
            open_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Opener whose port can never be opened.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn push(&self, read: ScriptedRead) {
        self.script.lock().push_back(read);
    }

    /// Successful opens so far.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Lines opened and not yet dropped.
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

impl SerialOpener for ScriptedSerialOpener {
    fn open(&self) -> HardwareResult<Box<dyn SerialLine>> {
        if !self.available {
            return Err(HardwareError::SerialUnavailable {
                port: self.port_name().to_string(),
                reason: "No such file or directory".to_string(),
            });
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedLine {
            script: self.script.clone(),
            open_handles: self.open_handles.clone(),
        }))
    }

    fn port_name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedLine {
    script: Arc<Mutex<VecDeque<ScriptedRead>>>,
    open_handles: Arc<AtomicUsize>,
}

impl SerialLine for ScriptedLine {
    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        match self.script.lock().pop_front() {
            Some(ScriptedRead::Line(bytes)) => Ok(bytes),
            Some(ScriptedRead::TimedOut) | None => {
                Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"))
            }
        }
    }
}

impl Drop for ScriptedLine {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// CAPABILITY FAKES
// =============================================================================

/// Returns queued results in order; `NoValidSample` once exhausted.
#[derive(Debug, Default)]
pub struct ScriptedWeightSource {
    results: Mutex<VecDeque<HardwareResult<Weight>>>,
}

impl ScriptedWeightSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue weights given in kilograms with two decimals, e.g. `"50.00"`.
    pub fn with_weights(weights: &[&str]) -> Self {
        let source = Self::new();
        for w in weights {
            if let Ok(weight) = w.parse() {
                source.push(Ok(weight));
            }
        }
        source
    }

    pub fn push(&self, result: HardwareResult<Weight>) {
        self.results.lock().push_back(result);
    }

    pub fn remaining(&self) -> usize {
        self.results.lock().len()
    }
}

impl WeightSource for ScriptedWeightSource {
    fn sample(&self) -> HardwareResult<Weight> {
        self.results
            .lock()
            .pop_front()
            .unwrap_or(Err(HardwareError::NoValidSample { attempts: 3 }))
    }
}

/// Returns queued tag reads in order; `TagNotPresented` once exhausted.
#[derive(Debug, Default)]
pub struct ScriptedTagSource {
    results: Mutex<VecDeque<HardwareResult<Uid>>>,
}

impl ScriptedTagSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, result: HardwareResult<Uid>) {
        self.results.lock().push_back(result);
    }

    pub fn push_uid(&self, uid: &str) {
        if let Ok(uid) = Uid::parse(uid) {
            self.push(Ok(uid));
        }
    }
}

impl TagSource for ScriptedTagSource {
    fn read_tag(&self) -> HardwareResult<Uid> {
        self.results
            .lock()
            .pop_front()
            .unwrap_or(Err(HardwareError::TagNotPresented {
                waited: std::time::Duration::ZERO,
            }))
    }
}

/// Card probe replaying queued results; an empty reader once exhausted.
#[derive(Debug, Default)]
pub struct ScriptedCardProbe {
    results: Mutex<VecDeque<HardwareResult<Option<Uid>>>>,
    calls: AtomicUsize,
}

impl ScriptedCardProbe {
    pub fn new(results: Vec<HardwareResult<Option<Uid>>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CardProbe for ScriptedCardProbe {
    fn probe(&self) -> HardwareResult<Option<Uid>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results.lock().pop_front().unwrap_or(Ok(None))
    }
}
