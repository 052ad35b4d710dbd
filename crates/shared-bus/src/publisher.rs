//! # Event Publisher
//!
//! The publishing side of disposal broadcasting.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::PublishResult;
use crate::events::DisposalEvent;
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;

/// Interface the disposal state machine uses to announce completed deltas.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Deliver one event. Returns once delivery is confirmed or has failed.
    async fn publish(&self, event: &DisposalEvent) -> PublishResult<()>;

    /// Events successfully handed off so far.
    fn events_published(&self) -> u64;
}

/// In-process bus over `tokio::sync::broadcast`.
///
/// Used by the simulated kiosk, where there is no broker to talk to.
/// Publishing with no subscribers is not an error.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<DisposalEvent>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Receive every event published after this call.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.sender.subscribe(), None)
    }

    /// Receive only records attributed to `company`.
    #[must_use]
    pub fn subscribe_company(&self, company: impl Into<String>) -> Subscription {
        Subscription::new(self.sender.subscribe(), Some(company.into()))
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: &DisposalEvent) -> PublishResult<()> {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event.clone()) {
            Ok(receivers) => {
                debug!(records = event.records.len(), receivers, "Disposal event published");
            }
            Err(_) => {
                warn!(records = event.records.len(), "Disposal event dropped (no subscribers)");
            }
        }
        Ok(())
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
