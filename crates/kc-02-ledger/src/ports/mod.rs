//! Ports (hexagonal architecture boundaries)

pub mod inbound;
pub mod outbound;

pub use inbound::WeightLedgerApi;
pub use outbound::{AggregateStore, UserDirectory};
