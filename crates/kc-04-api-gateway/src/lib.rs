//! # kc-04-api-gateway
//!
//! The kiosk terminal's HTTP surface.
//!
//! ```text
//! Terminal ──HTTP──→ TraceLayer → TimeoutLayer → handlers ──→ DisposalApi
//!                                                   │
//!                              GatewayError ←───────┘ (DisposalError → status + JSON)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use kc_04_api_gateway::{ApiGatewayService, GatewayConfig};
//!
//! let service = ApiGatewayService::new(GatewayConfig::default(), machine)?;
//! service.start(shutdown_rx).await?;
//! ```

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{ConfigError, GatewayConfig, GatewayError, GatewayResult, TagRequest};
pub use router::{build_router, AppState};
pub use service::ApiGatewayService;
