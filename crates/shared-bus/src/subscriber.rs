//! # Event Subscriber
//!
//! The receiving side of [`InMemoryEventBus`](crate::InMemoryEventBus).

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

use crate::events::DisposalEvent;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was dropped.
    #[error("Event bus closed")]
    Closed,
}

/// Handle for receiving disposal events.
pub struct Subscription {
    receiver: broadcast::Receiver<DisposalEvent>,
    company: Option<String>,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<DisposalEvent>, company: Option<String>) -> Self {
        Self { receiver, company }
    }

    fn matches(&self, event: &DisposalEvent) -> bool {
        match &self.company {
            None => true,
            Some(company) => event.records.iter().any(|r| &r.company == company),
        }
    }

    /// Next matching event, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<DisposalEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some events dropped");
                    continue;
                }
            };

            if self.matches(&event) {
                return Some(event);
            }
        }
    }

    /// Non-blocking receive. `Ok(None)` means nothing is queued.
    pub fn try_recv(&mut self) -> Result<Option<DisposalEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    /// Company this subscription is restricted to, if any.
    #[must_use]
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }
}
