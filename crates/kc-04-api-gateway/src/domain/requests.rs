//! Request and response bodies that are not disposal outcomes.

use serde::{Deserialize, Serialize};
use shared_types::Uid;

use super::error::{GatewayError, GatewayResult};

/// Body of `POST /authenticate` and `POST /confirm`.
///
/// Without `tag_uid` the gateway reads the tag from the reader itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TagRequest {
    #[serde(default)]
    pub tag_uid: Option<Uid>,
}

impl TagRequest {
    /// An empty body is the same as `{}`.
    pub fn parse(body: &str) -> GatewayResult<Self> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(body).map_err(|e| GatewayError::BadRequest(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagResponse {
    pub uid: Uid,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
