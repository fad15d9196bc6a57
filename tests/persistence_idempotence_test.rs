//! Integration tests for persistence guarantees that need a real database:
//! at-most-once daily snapshots, ban/unban no-ops and the audit trail kept
//! by the AI pipelines on their fallback paths.
//!
//! These tests run against the PostgreSQL instance named by
//! `TEST_DATABASE_URL` and skip silently when it is not set.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ChatBuddy::config::Settings;
use ChatBuddy::database::{run_migrations, DatabaseService};
use ChatBuddy::handlers::commands::admin::{ban_check, unban_check, BanCheck, UnbanCheck};
use ChatBuddy::handlers::messages::ai_pipeline;
use ChatBuddy::models::{CreateMessageRequest, CreateUserRequest};
use ChatBuddy::services::ServiceFactory;

async fn test_pool() -> Option<PgPool> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set; skipping database test");
            return None;
        }
    };
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database");
    run_migrations(&pool).await.expect("run migrations");
    Some(pool)
}

/// Collision-free identifier for rows created by one test run
fn unique(tag: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    format!("{}-{}-{}", tag, std::process::id(), nanos)
}

#[tokio::test]
async fn daily_snapshot_is_recorded_at_most_once() {
    let Some(pool) = test_pool().await else { return };
    let db = DatabaseService::new(pool.clone());

    let date = NaiveDate::from_ymd_opt(2001, 2, 3).expect("date");
    sqlx::query("DELETE FROM bot_stats WHERE date = $1")
        .bind(date)
        .execute(&pool)
        .await
        .expect("reset snapshot rows");

    let metrics: &[(&str, i64)] = &[("total_users", 3), ("total_messages", 14)];

    assert!(db.stats.record_snapshot(date, metrics).await.unwrap());
    assert!(db.stats.exists_for_date(date).await.unwrap());

    // A second run on the same date inserts nothing
    assert!(!db.stats.record_snapshot(date, metrics).await.unwrap());

    let rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bot_stats WHERE date = $1")
        .bind(date)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows.0, metrics.len() as i64);
}

#[tokio::test]
async fn ban_flips_atomically_and_repeats_are_no_ops() {
    let Some(pool) = test_pool().await else { return };
    let db = DatabaseService::new(pool);

    let admin = db
        .users
        .create(CreateUserRequest {
            phone_number: unique("+1555admin"),
            name: Some("Moderator".to_string()),
            is_admin: true,
        })
        .await
        .unwrap();
    let target = db
        .users
        .create(CreateUserRequest {
            phone_number: unique("+1555target"),
            name: None,
            is_admin: false,
        })
        .await
        .unwrap();

    assert_eq!(ban_check(&target), BanCheck::Proceed);
    assert_eq!(ban_check(&admin), BanCheck::TargetIsAdmin);

    let banned = db.users.ban(target.id, admin.id, "spam").await.unwrap();
    assert!(banned.is_banned);
    assert_eq!(banned.banned_by, Some(admin.id));
    assert!(banned.banned_at.is_some());
    assert_eq!(banned.ban_reason.as_deref(), Some("spam"));

    // A second ban request stops at the pre-flight check
    assert_eq!(ban_check(&banned), BanCheck::AlreadyBanned);

    let unbanned = db.users.unban(banned.id).await.unwrap();
    assert!(!unbanned.is_banned);
    assert!(unbanned.banned_by.is_none());
    assert!(unbanned.banned_at.is_none());
    assert!(unbanned.ban_reason.is_none());

    // Same for a second unban request
    assert_eq!(unban_check(&unbanned), UnbanCheck::NotBanned);
    assert_eq!(unban_check(&banned), UnbanCheck::Proceed);
}

#[tokio::test]
async fn duplicate_delivery_keeps_one_audit_row() {
    let Some(pool) = test_pool().await else { return };
    let db = DatabaseService::new(pool.clone());

    let user = db
        .users
        .create(CreateUserRequest {
            phone_number: unique("+1555audit"),
            name: None,
            is_admin: false,
        })
        .await
        .unwrap();

    let message_id = unique("wamid");
    let audit = CreateMessageRequest {
        message_id: message_id.clone(),
        user_id: user.id,
        group_id: None,
        content: Some("hello".to_string()),
        message_type: "text".to_string(),
        is_command: false,
        command_name: None,
    };

    db.messages.create(audit.clone()).await.unwrap();
    db.messages.create(audit).await.unwrap();

    let rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE message_id = $1")
        .bind(&message_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows.0, 1);
}

#[tokio::test]
async fn failed_file_analysis_still_logs_the_ai_request() {
    let Some(pool) = test_pool().await else { return };
    let db = DatabaseService::new(pool);

    let transport = MockServer::start().await;
    let gemini = MockServer::start().await;

    // Outbound sends (reaction, ack, fallback reply) all succeed
    Mock::given(method("POST"))
        .and(path("/phone-1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "messages": [{"id": "wamid.out"}]
        })))
        .mount(&transport)
        .await;
    Mock::given(method("GET"))
        .and(path("/media-99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": format!("{}/files/notes.txt", transport.uri()),
            "mime_type": "text/plain",
            "id": "media-99",
        })))
        .mount(&transport)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/notes.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello world".to_vec()))
        .mount(&transport)
        .await;

    // The AI backend is down for the day
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .mount(&gemini)
        .await;

    let mut settings = Settings::default();
    settings.whatsapp.phone_id = "phone-1".to_string();
    settings.whatsapp.access_token = "test-token".to_string();
    settings.whatsapp.api_url = transport.uri();
    settings.ai.api_key = "test-key".to_string();
    settings.ai.api_url = gemini.uri();

    let services = Arc::new(ServiceFactory::new(settings, db.clone()).expect("services"));
    let user = db
        .get_or_create_user(&unique("+1555file"), Some("Filer"), None)
        .await
        .unwrap();

    let ai_rows_before = db.ai_requests.count().await.unwrap();
    let file_rows_before = db.files.count().await.unwrap();

    ai_pipeline::handle_document(&services, &user, "wamid.in", "media-99", "notes.txt")
        .await
        .unwrap();

    // The failed exchange leaves both audit rows behind
    assert_eq!(db.ai_requests.count().await.unwrap(), ai_rows_before + 1);
    assert_eq!(db.files.count().await.unwrap(), file_rows_before + 1);
}
