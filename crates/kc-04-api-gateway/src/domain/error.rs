//! Gateway errors and their HTTP rendering.
//!
//! This is the one place a [`DisposalError`] becomes a status code. The
//! kiosk terminal keys its screens off these codes, including the two
//! non-standard ones:
//!
//! | Error | Status |
//! |-------|--------|
//! | `UserNotFound`, `CompanyNotFound` | 404 |
//! | `AlreadyActive` | 409 |
//! | `TagMismatch` | 555 |
//! | `NoValidSample` | 484 |
//! | `StaleOrMissingSession`, `Interrupted`, bad request body | 400 |
//! | `SerialUnavailable`, `HardwareUnavailable` | 503 |
//! | `TagNotPresented` | 204, no body (`/tag`, `/authenticate`) |
//! | anything else | 500 |
//!
//! Every error except 204 carries `{"error": {"code", "message"}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kc_03_disposal::DisposalError;
use serde::Serialize;
use thiserror::Error;

use super::config::ConfigError;

/// Status the terminal treats as "wrong tag, ask again".
pub const TAG_MISMATCH_STATUS: u16 = 555;

/// Status the terminal treats as "scale gave no reading".
pub const NO_VALID_SAMPLE_STATUS: u16 = 484;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Disposal(#[from] DisposalError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Metrics unavailable: {0}")]
    Metrics(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Disposal(e) => disposal_status(e),
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Server(_) | Self::Metrics(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Disposal(e) => e.code(),
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Config(_) => "CONFIG",
            Self::Server(_) => "SERVER",
            Self::Metrics(_) => "METRICS",
        }
    }
}

fn disposal_status(e: &DisposalError) -> StatusCode {
    match e {
        DisposalError::UserNotFound { .. } | DisposalError::CompanyNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        DisposalError::AlreadyActive { .. } => StatusCode::CONFLICT,
        DisposalError::TagMismatch { .. } => custom(TAG_MISMATCH_STATUS),
        DisposalError::NoValidSample { .. } => custom(NO_VALID_SAMPLE_STATUS),
        DisposalError::StaleOrMissingSession | DisposalError::Interrupted => {
            StatusCode::BAD_REQUEST
        }
        DisposalError::SerialUnavailable { .. } | DisposalError::HardwareUnavailable { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        DisposalError::TagNotPresented => StatusCode::NO_CONTENT,
        DisposalError::PublishFailure { .. }
        | DisposalError::Storage { .. }
        | DisposalError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn custom(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }
        let payload = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(payload)).into_response()
    }
}
