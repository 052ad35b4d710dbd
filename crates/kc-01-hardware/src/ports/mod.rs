//! Ports (hexagonal architecture boundaries)

pub mod inbound;
pub mod outbound;

pub use inbound::{TagSource, WeightSource};
pub use outbound::{Actuator, CardProbe, SerialLine, SerialOpener};
