//! Routes and handlers.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /health` | liveness |
//! | `GET /tag` | one blocking tag acquisition |
//! | `POST /authenticate` | `{tag_uid?}` → session started, barrier unlocked |
//! | `POST /confirm` | `{tag_uid?}` → tag matches the session; no tag on the reader is a mismatch |
//! | `POST /finalize` | re-weigh, book the delta, lock |
//! | `POST /reset` | safe state |
//! | `GET /status` | phase, lock, session |
//! | `GET /metrics` | Prometheus text |

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use kc_03_disposal::{
    AuthOutcome, ConfirmOutcome, DisposalApi, DisposalError, KioskStatus, Receipt, ResetOutcome,
};
use shared_types::Uid;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::domain::{
    GatewayConfig, GatewayError, GatewayResult, HealthResponse, TagRequest, TagResponse,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub disposal: Arc<dyn DisposalApi>,
}

impl AppState {
    pub fn new(disposal: Arc<dyn DisposalApi>) -> Self {
        Self { disposal }
    }
}

pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.request_timeout()));

    Router::new()
        .route("/health", get(health_check))
        .route("/tag", get(read_tag))
        .route("/authenticate", post(authenticate))
        .route("/confirm", post(confirm))
        .route("/finalize", post(finalize))
        .route("/reset", post(reset))
        .route("/status", get(status))
        .route("/metrics", get(metrics))
        .layer(middleware)
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn read_tag(State(state): State<AppState>) -> GatewayResult<Json<TagResponse>> {
    let uid = state.disposal.read_tag().await?;
    Ok(Json(TagResponse { uid }))
}

async fn authenticate(
    State(state): State<AppState>,
    body: String,
) -> GatewayResult<Json<AuthOutcome>> {
    let uid = resolve_tag(&state, &body).await?;
    Ok(Json(state.disposal.authenticate(uid).await?))
}

async fn confirm(
    State(state): State<AppState>,
    body: String,
) -> GatewayResult<Json<ConfirmOutcome>> {
    let uid = match resolve_tag(&state, &body).await {
        Err(GatewayError::Disposal(DisposalError::TagNotPresented))
            if state.disposal.status().session.is_some() =>
        {
            return Err(DisposalError::TagMismatch {
                detail: "no tag presented".to_string(),
            }
            .into())
        }
        Err(GatewayError::Disposal(DisposalError::TagNotPresented)) => {
            return Err(DisposalError::StaleOrMissingSession.into())
        }
        other => other?,
    };
    Ok(Json(state.disposal.confirm(uid).await?))
}

async fn finalize(State(state): State<AppState>) -> GatewayResult<Json<Receipt>> {
    Ok(Json(state.disposal.finalize().await?))
}

async fn reset(State(state): State<AppState>) -> Json<ResetOutcome> {
    Json(state.disposal.reset().await)
}

async fn status(State(state): State<AppState>) -> Json<KioskStatus> {
    Json(state.disposal.status())
}

async fn metrics() -> GatewayResult<impl IntoResponse> {
    let text = kiosk_telemetry::encode_metrics().map_err(|e| GatewayError::Metrics(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text))
}

/// The tag from the body, or from the reader when the body has none.
async fn resolve_tag(state: &AppState, body: &str) -> GatewayResult<Uid> {
    match TagRequest::parse(body)?.tag_uid {
        Some(uid) => Ok(uid),
        None => Ok(state.disposal.read_tag().await?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use kc_03_disposal::testing::KioskHarness;
    use serde_json::Value;
    use shared_types::{LockState, Weight};
    use tower::ServiceExt;

    fn router(h: &KioskHarness) -> Router {
        build_router(AppState::new(h.machine.clone()), &GatewayConfig::default())
    }

    async fn call(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    fn kg(hundredths: i64) -> Weight {
        Weight::from_hundredths(hundredths)
    }

    #[tokio::test]
    async fn test_health() {
        let h = KioskHarness::new();
        let (status, body) = call(&router(&h), "GET", "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_disposal_over_http() {
        let h = KioskHarness::new();
        let app = router(&h);
        h.scale.push(Ok(kg(5000)));
        h.scale.push(Ok(kg(5270)));

        let (status, body) = call(&app, "POST", "/authenticate", r#"{"tag_uid":"UID1"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session_started"], true);
        assert_eq!(body["baseline_weight"], 50.0);

        let (status, body) = call(&app, "POST", "/confirm", r#"{"tag_uid":"UID2"}"#).await;
        assert_eq!(status.as_u16(), 555);
        assert_eq!(body["error"]["code"], "TAG_MISMATCH");

        let (status, body) = call(&app, "POST", "/confirm", r#"{"tag_uid":"UID1"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["confirmed"], true);

        let (status, body) = call(&app, "POST", "/finalize", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["delta"], 2.7);
        assert_eq!(body["company_total"], 42.7);
        assert_eq!(body["message"], "Kim disposed 2.70 kg");
        assert_eq!(h.lock_state(), LockState::Locked);
    }

    #[tokio::test]
    async fn test_unknown_user_is_404() {
        let h = KioskHarness::new();
        let (status, body) =
            call(&router(&h), "POST", "/authenticate", r#"{"tag_uid":"00 11"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "USER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_second_authenticate_is_409() {
        let h = KioskHarness::new();
        let app = router(&h);
        h.scale.push(Ok(kg(1000)));
        call(&app, "POST", "/authenticate", r#"{"tag_uid":"UID1"}"#).await;

        let (status, _) = call(&app, "POST", "/authenticate", r#"{"tag_uid":"UID1"}"#).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_scale_failure_is_484() {
        let h = KioskHarness::new();
        let (status, body) =
            call(&router(&h), "POST", "/authenticate", r#"{"tag_uid":"UID1"}"#).await;
        assert_eq!(status.as_u16(), 484);
        assert_eq!(body["error"]["code"], "NO_VALID_SAMPLE");
    }

    #[tokio::test]
    async fn test_confirm_without_session_is_400() {
        let h = KioskHarness::new();
        let (status, _) = call(&router(&h), "POST", "/confirm", r#"{"tag_uid":"UID1"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_authenticate_reads_tag_when_body_empty() {
        let h = KioskHarness::new();
        h.tags.push_uid("UID2");
        h.scale.push(Ok(kg(700)));

        let (status, body) = call(&router(&h), "POST", "/authenticate", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uid"], "UID2");
    }

    #[tokio::test]
    async fn test_confirm_with_empty_reader_is_555() {
        let h = KioskHarness::new();
        let app = router(&h);
        h.scale.push(Ok(kg(1000)));
        let (status, _) = call(&app, "POST", "/authenticate", r#"{"tag_uid":"UID1"}"#).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, "POST", "/confirm", "").await;
        assert_eq!(status.as_u16(), 555);
        assert_eq!(body["error"]["code"], "TAG_MISMATCH");
        assert_eq!(h.lock_state(), LockState::Unlocked);

        h.tags.push_uid("UID1");
        let (status, body) = call(&app, "POST", "/confirm", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["confirmed"], true);
    }

    #[tokio::test]
    async fn test_confirm_with_empty_reader_and_no_session_is_400() {
        let h = KioskHarness::new();
        let (status, body) = call(&router(&h), "POST", "/confirm", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "STALE_OR_MISSING_SESSION");
    }

    #[tokio::test]
    async fn test_tag_endpoint() {
        let h = KioskHarness::new();
        let app = router(&h);
        h.tags.push_uid("df 79 1a 82");

        let (status, body) = call(&app, "GET", "/tag", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uid"], "DF 79 1A 82");

        let (status, body) = call(&app, "GET", "/tag", "").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let h = KioskHarness::new();
        let (status, body) = call(&router(&h), "POST", "/authenticate", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_reset_and_status() {
        let h = KioskHarness::new();
        let app = router(&h);
        h.scale.push(Ok(kg(1000)));
        call(&app, "POST", "/authenticate", r#"{"tag_uid":"UID1"}"#).await;

        let (_, body) = call(&app, "GET", "/status", "").await;
        assert_eq!(body["phase"], "disposing");
        assert_eq!(body["lock"], "unlocked");
        assert_eq!(body["session"]["uid"], "UID1");

        let (status, body) = call(&app, "POST", "/reset", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleared"], true);

        let (_, body) = call(&app, "GET", "/status", "").await;
        assert_eq!(body["phase"], "idle");
        assert_eq!(body["lock"], "locked");
        assert_eq!(body["session"], Value::Null);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        kiosk_telemetry::register_metrics().unwrap();
        let h = KioskHarness::new();
        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = router(&h).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("kiosk_sessions_started_total"));
    }
}
