//! # Shared Bus - Disposal Event Publishing
//!
//! Every completed disposal is broadcast as a JSON array of weight records
//! so that downstream dashboards can attribute the delta to a company.
//!
//! ```text
//! ┌──────────────────┐   publish(&DisposalEvent)   ┌──────────────────┐
//! │ DisposalMachine  │ ──────────────────────────→ │  EventPublisher  │
//! └──────────────────┘                             └────────┬─────────┘
//!                                                           │
//!                          ┌────────────────────────────────┼───────────────┐
//!                          ▼                                ▼               ▼
//!                  MqttEventPublisher               InMemoryEventBus   RecordingPublisher
//!                  (broker, ack-waited)             (local subscribers) (tests)
//! ```
//!
//! ## Delivery Semantics
//!
//! Publishing is best-effort. A failure is reported as [`PublishError`]; the
//! caller logs it and carries on, because the ledger write it describes has
//! already been committed.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod backoff;
pub mod error;
pub mod events;
pub mod mqtt;
pub mod publisher;
pub mod subscriber;
pub mod testing;

// Re-export main types
pub use backoff::ReconnectBackoff;
pub use error::{PublishError, PublishResult};
pub use events::{DisposalEvent, WeightRecord};
pub use mqtt::{MqttConfig, MqttEventPublisher};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};
pub use testing::{FailingPublisher, RecordingPublisher};

/// Maximum events to buffer per in-memory subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Topic the kiosk publishes disposal deltas to unless configured otherwise.
pub const DEFAULT_TOPIC: &str = "kiosk/disposal";
