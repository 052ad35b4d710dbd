//! Domain layer for the gateway

pub mod config;
pub mod error;
pub mod requests;

pub use config::{ConfigError, GatewayConfig};
pub use error::{ErrorDetail, ErrorResponse, GatewayError, GatewayResult};
pub use requests::{HealthResponse, TagRequest, TagResponse};
