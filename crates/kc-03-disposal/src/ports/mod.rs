//! Ports (hexagonal architecture boundaries)
//!
//! Outbound dependencies are the hardware, ledger and bus ports, wired in
//! through [`KioskPorts`](crate::KioskPorts).

pub mod inbound;

pub use inbound::DisposalApi;
