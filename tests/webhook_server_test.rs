//! Integration tests for the HTTP surface: webhook verification handshake,
//! delivery acknowledgement and the health endpoint.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use ChatBuddy::config::Settings;
use ChatBuddy::database::DatabaseService;
use ChatBuddy::server::build_router;
use ChatBuddy::services::ServiceFactory;

/// Services backed by a lazy pool that never reaches a real database.
/// The short acquire timeout keeps the health check's failure fast.
fn test_services() -> Arc<ServiceFactory> {
    let mut settings = Settings::default();
    settings.whatsapp.verify_token = "test-verify-token".to_string();

    let pool = sqlx::postgres::PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_millis(200))
        .connect_lazy("postgresql://localhost/unused")
        .expect("lazy pool");
    Arc::new(ServiceFactory::new(settings, DatabaseService::new(pool)).expect("services"))
}

#[tokio::test]
async fn webhook_verification_echoes_challenge() {
    let app = build_router(test_services());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/webhook?hub.mode=subscribe&hub.verify_token=test-verify-token&hub.challenge=424242")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"424242");
}

#[tokio::test]
async fn webhook_verification_rejects_bad_token() {
    let app = build_router(test_services());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=424242")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn webhook_delivery_is_acknowledged_immediately() {
    let app = build_router(test_services());

    // Status-only notification: no messages to process
    let payload = serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "1",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "statuses": [{"id": "wamid.x", "status": "read"}]
                }
            }]
        }]
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn webhook_rejects_malformed_body() {
    let app = build_router(test_services());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn health_endpoint_reports_database_state() {
    let app = build_router(test_services());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // The endpoint stays up and degrades when the database is unreachable
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["database"], "down");
    assert_eq!(json["name"], "ChatBuddy");
}

#[tokio::test]
async fn dashboard_serves_html() {
    let app = build_router(test_services());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("ChatBuddy Dashboard"));
}
