//! Publishers for tests and simulations.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{PublishError, PublishResult};
use crate::events::DisposalEvent;
use crate::publisher::EventPublisher;

/// Keeps every event it is handed.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<DisposalEvent>>,
}

impl RecordingPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<DisposalEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &DisposalEvent) -> PublishResult<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn events_published(&self) -> u64 {
        self.events.lock().len() as u64
    }
}

/// Fails every publish, counting the attempts.
#[derive(Default)]
pub struct FailingPublisher {
    attempts: AtomicU64,
}

impl FailingPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, _event: &DisposalEvent) -> PublishResult<()> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Err(PublishError::Client("broker unreachable".to_string()))
    }

    fn events_published(&self) -> u64 {
        0
    }
}
