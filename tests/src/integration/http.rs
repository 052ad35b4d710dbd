//! # Terminal Over HTTP
//!
//! The kiosk terminal posts empty bodies and lets the kiosk read whichever
//! card is on the reader.

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use kc_04_api_gateway::{build_router, AppState, GatewayConfig};
    use serde_json::Value;
    use shared_types::LockState;
    use tower::ServiceExt;

    use crate::fixtures::DeviceKiosk;

    const KIM: &str = "DF 79 1A 82";

    fn terminal(kiosk: &DeviceKiosk) -> Router {
        build_router(
            AppState::new(kiosk.machine.clone()),
            &GatewayConfig::default(),
        )
    }

    async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_terminal_session_with_card_on_reader() {
        let kiosk = DeviceKiosk::new();
        let app = terminal(&kiosk);

        kiosk.card.present(KIM);
        kiosk.scale_reads("50.00");
        let (status, body) = send(&app, "POST", "/authenticate").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uid"], KIM);
        assert_eq!(body["name"], "Kim");
        assert_eq!(kiosk.lock_state(), LockState::Unlocked);

        let (status, body) = send(&app, "POST", "/confirm").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["confirmed"], true);

        kiosk.card.lift();
        kiosk.scale_reads("47.25");
        let (status, body) = send(&app, "POST", "/finalize").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["delta"], -2.75);
        assert_eq!(body["company_total"], 37.25);
        assert_eq!(body["assignment_code"], 8414);

        let (_, body) = send(&app, "GET", "/status").await;
        assert_eq!(body["phase"], "idle");
        assert_eq!(body["lock"], "locked");
    }

    #[tokio::test]
    async fn test_confirm_with_someone_elses_card_is_555() {
        let kiosk = DeviceKiosk::new();
        kiosk.register("04 A2 19", "Lee", "Acme", 8414);
        let app = terminal(&kiosk);

        kiosk.card.present(KIM);
        kiosk.scale_reads("5.00");
        send(&app, "POST", "/authenticate").await;

        kiosk.card.present("04 A2 19");
        let (status, body) = send(&app, "POST", "/confirm").await;
        assert_eq!(status.as_u16(), 555);
        assert_eq!(body["error"]["code"], "TAG_MISMATCH");

        // Finalize before a good confirm is refused and the barrier stays open.
        let (status, _) = send(&app, "POST", "/finalize").await;
        assert_eq!(status.as_u16(), 555);
        assert_eq!(kiosk.lock_state(), LockState::Unlocked);
    }

    #[tokio::test]
    async fn test_empty_reader() {
        let kiosk = DeviceKiosk::new();
        let app = terminal(&kiosk);

        let (status, body) = send(&app, "GET", "/tag").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, "POST", "/authenticate").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(kiosk.lock_state(), LockState::Locked);
    }

    #[tokio::test]
    async fn test_confirm_after_card_lifted_reprompts() {
        let kiosk = DeviceKiosk::new();
        let app = terminal(&kiosk);

        kiosk.card.present(KIM);
        kiosk.scale_reads("5.00");
        send(&app, "POST", "/authenticate").await;

        kiosk.card.lift();
        let (status, body) = send(&app, "POST", "/confirm").await;
        assert_eq!(status.as_u16(), 555);
        assert_eq!(body["error"]["code"], "TAG_MISMATCH");
        assert_eq!(kiosk.lock_state(), LockState::Unlocked);

        kiosk.card.present(KIM);
        let (status, _) = send(&app, "POST", "/confirm").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_silent_scale_is_484() {
        let kiosk = DeviceKiosk::new();
        let app = terminal(&kiosk);
        kiosk.card.present(KIM);

        let (status, body) = send(&app, "POST", "/authenticate").await;
        assert_eq!(status.as_u16(), 484);
        assert_eq!(body["error"]["code"], "NO_VALID_SAMPLE");
        assert_eq!(kiosk.lock_state(), LockState::Locked);
    }

    #[tokio::test]
    async fn test_metrics_count_scale_reads() {
        kiosk_telemetry::register_metrics().unwrap();
        let kiosk = DeviceKiosk::new();
        let app = terminal(&kiosk);
        kiosk.card.present(KIM);
        kiosk.scale_lines(&["ST,GS,  1.00 kg", "garbage", "ST,GS,  1.00 kg"]);
        send(&app, "POST", "/authenticate").await;

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(text.contains("kiosk_scale_samples_total{outcome=\"valid\"}"));
        assert!(text.contains("kiosk_scale_samples_total{outcome=\"invalid\"}"));
        assert!(text.contains("kiosk_sessions_started_total"));
    }
}
