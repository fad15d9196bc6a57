//! HTTP server module
//!
//! Hosts the WhatsApp webhook endpoints, the stats API and a minimal HTML
//! dashboard. Webhook delivery is acknowledged immediately; message
//! processing happens in detached tasks so Meta's delivery timeout is
//! never tied to AI latency.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::handlers;
use crate::services::{ServiceFactory, WebhookPayload};
use crate::utils::errors::Result;
use crate::utils::helpers::format_uptime;

type AppState = Arc<ServiceFactory>;

/// Build the application router
pub fn build_router(services: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .route("/api/stats", get(api_stats))
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(services)
}

/// Bind and serve until the process is stopped
pub async fn run(services: AppState) -> Result<()> {
    let addr = format!(
        "{}:{}",
        services.settings.server.host, services.settings.server.port
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    let router = build_router(services);
    axum::serve(listener, router).await?;
    Ok(())
}

// --- Webhook ----------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Meta's subscription handshake: echo the challenge only for a subscribe
/// request carrying the configured verify token.
pub fn verification_challenge(expected_token: &str, params: &VerifyParams) -> Option<String> {
    if params.mode.as_deref() != Some("subscribe") {
        return None;
    }
    if params.verify_token.as_deref() != Some(expected_token) {
        return None;
    }
    params.challenge.clone()
}

async fn verify_webhook(
    State(services): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    match verification_challenge(&services.settings.whatsapp.verify_token, &params) {
        Some(challenge) => {
            info!("Webhook verification succeeded");
            (StatusCode::OK, challenge).into_response()
        }
        None => {
            warn!("Webhook verification rejected");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

async fn receive_webhook(
    State(services): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> StatusCode {
    let messages = payload.inbound_messages();
    debug!(count = messages.len(), "Webhook delivery received");

    for message in messages {
        let services = services.clone();
        tokio::spawn(async move {
            handlers::messages::handle_inbound(&services, message).await;
        });
    }

    // Always 200: a non-2xx makes Meta redeliver, and duplicates are
    // already handled by the message_id constraint
    StatusCode::OK
}

// --- Dashboard & stats API ---------------------------------------------------

async fn health(State(services): State<AppState>) -> Json<serde_json::Value> {
    let database = match services.db.health().await {
        Ok(()) => "up",
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            "down"
        }
    };
    Json(json!({
        "status": if database == "up" { "ok" } else { "degraded" },
        "database": database,
        "name": crate::NAME,
        "version": crate::VERSION,
        "uptime": format_uptime(services.analytics.uptime()),
    }))
}

async fn api_stats(State(services): State<AppState>) -> Response {
    match services.analytics.dashboard_stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to assemble dashboard stats");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "stats unavailable"})),
            )
                .into_response()
        }
    }
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>ChatBuddy Dashboard</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 720px; color: #222; }
  h1 { font-size: 1.4rem; }
  .cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(160px, 1fr)); gap: 1rem; }
  .card { border: 1px solid #ddd; border-radius: 8px; padding: 1rem; text-align: center; }
  .card .value { font-size: 1.8rem; font-weight: 600; }
  .card .label { color: #666; font-size: 0.85rem; }
  table { width: 100%; border-collapse: collapse; margin-top: 1.5rem; }
  td, th { padding: 0.4rem 0.6rem; border-bottom: 1px solid #eee; text-align: left; }
</style>
</head>
<body>
<h1>🤖 ChatBuddy Dashboard</h1>
<div class="cards" id="cards"></div>
<table id="commands"><thead><tr><th>Command</th><th>Uses</th></tr></thead><tbody></tbody></table>
<script>
async function refresh() {
  const res = await fetch('/api/stats');
  if (!res.ok) return;
  const stats = await res.json();
  const o = stats.overview;
  const cards = [
    [o.total_users, 'Users'],
    [o.total_messages, 'Messages'],
    [o.ai_requests, 'AI requests'],
    [o.files_processed, 'Files'],
    [o.commands_used, 'Commands'],
    [o.uptime, 'Uptime'],
  ];
  document.getElementById('cards').innerHTML = cards
    .map(([v, l]) => `<div class="card"><div class="value">${v}</div><div class="label">${l}</div></div>`)
    .join('');
  document.querySelector('#commands tbody').innerHTML = stats.popular_commands
    .map(c => `<tr><td>${c.command}</td><td>${c.count}</td></tr>`)
    .join('');
}
refresh();
setInterval(refresh, 30000);
</script>
</body>
</html>"#;
