//! Integration tests for the intake pipeline logic: payload normalization,
//! classification, command gating and rate limiting working together,
//! without a live database or transport.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use ChatBuddy::config::Settings;
use ChatBuddy::database::DatabaseService;
use ChatBuddy::handlers::commands::{gate, parse_command, CommandGate};
use ChatBuddy::handlers::{classify, MessageRoute};
use ChatBuddy::middleware::{AdmitDecision, RateLimitConfig, RateLimiter};
use ChatBuddy::models::User;
use ChatBuddy::services::{ServiceFactory, WebhookPayload};

fn test_services() -> Arc<ServiceFactory> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgresql://localhost/unused")
        .expect("lazy pool");
    Arc::new(
        ServiceFactory::new(Settings::default(), DatabaseService::new(pool)).expect("services"),
    )
}

fn user(is_admin: bool, is_banned: bool) -> User {
    User {
        id: 7,
        phone_number: "15550001111".to_string(),
        name: Some("Ada".to_string()),
        is_admin,
        is_banned,
        banned_by: None,
        banned_at: None,
        ban_reason: None,
        created_at: Utc::now(),
        last_seen: Utc::now(),
    }
}

/// A realistic webhook delivery flows from wire JSON to a command route
#[tokio::test]
async fn payload_to_command_route() {
    let services = test_services();
    let json = r#"{
        "object": "whatsapp_business_account",
        "entry": [{"id": "1", "changes": [{"field": "messages", "value": {
            "messaging_product": "whatsapp",
            "contacts": [{"wa_id": "15550001111", "profile": {"name": "Ada"}}],
            "messages": [{
                "id": "wamid.cmd",
                "from": "15550001111",
                "type": "text",
                "text": {"body": "/ban @bob spamming"}
            }]
        }}]}]
    }"#;

    let payload: WebhookPayload = serde_json::from_str(json).unwrap();
    let inbound = payload.inbound_messages();
    assert_eq!(inbound.len(), 1);

    let route = classify(&services, &inbound[0].kind);
    let MessageRoute::Command { name, args } = route else {
        panic!("expected command route");
    };
    assert_eq!(name, "ban");
    assert_eq!(args, "@bob spamming");

    // The admin requirement is enforced before any handler runs
    assert_eq!(gate(&user(false, false), &name), CommandGate::AccessDenied);
    assert_eq!(gate(&user(true, false), &name), CommandGate::Proceed);
}

/// Banned senders are rejected at the gate regardless of what they send
#[test]
fn banned_user_is_gated_everywhere() {
    let banned = user(true, true);
    for text in ["/help", "/ban @x", "/nonsense"] {
        let (name, _) = parse_command(text, "/").unwrap();
        assert_eq!(gate(&banned, &name), CommandGate::Banned, "{}", text);
    }
}

/// One sender exhausting the window does not affect another, and rejected
/// attempts do not extend the lockout
#[test]
fn rate_limiter_isolates_identities_under_burst() {
    let limiter = RateLimiter::new(
        RateLimitConfig {
            max_requests: 3,
            window: Duration::from_secs(60),
        },
        vec![],
    );
    let t0 = Instant::now() + Duration::from_secs(3600);

    for i in 0..3 {
        assert!(limiter
            .admit_at("spammer", t0 + Duration::from_secs(i))
            .is_admitted());
    }
    // Burst of rejected attempts
    for i in 3..20 {
        let decision = limiter.admit_at("spammer", t0 + Duration::from_secs(i));
        assert!(matches!(decision, AdmitDecision::Rejected { .. }));
    }
    // An unrelated sender is unaffected
    assert!(limiter
        .admit_at("bystander", t0 + Duration::from_secs(10))
        .is_admitted());
    // The spammer recovers once the window slides past the admissions
    assert!(limiter
        .admit_at("spammer", t0 + Duration::from_secs(62))
        .is_admitted());
}

/// Unsupported documents are turned away at classification, before any
/// media download happens
#[tokio::test]
async fn unsupported_document_never_reaches_download() {
    let services = test_services();
    let json = r#"{
        "object": "whatsapp_business_account",
        "entry": [{"id": "1", "changes": [{"field": "messages", "value": {
            "messaging_product": "whatsapp",
            "messages": [{
                "id": "wamid.doc",
                "from": "15550001111",
                "type": "document",
                "document": {"id": "media-1", "filename": "malware.exe", "mime_type": "application/octet-stream"}
            }]
        }}]}]
    }"#;

    let payload: WebhookPayload = serde_json::from_str(json).unwrap();
    let route = classify(&services, &payload.inbound_messages()[0].kind);
    assert_eq!(
        route,
        MessageRoute::Unsupported("document:malware.exe".to_string())
    );
}
