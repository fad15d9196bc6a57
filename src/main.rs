//! ChatBuddy WhatsApp Bot
//!
//! Main application entry point

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info};

use ChatBuddy::config::Settings;
use ChatBuddy::database::{connection, DatabaseService};
use ChatBuddy::services::ServiceFactory;
use ChatBuddy::utils::logging;
use ChatBuddy::{server, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard must outlive the server loop
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!(version = VERSION, "Starting ChatBuddy WhatsApp bot...");

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = connection::DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        ..Default::default()
    };
    let db_pool = connection::create_pool(&db_config).await?;

    // Run database migrations
    connection::run_migrations(&db_pool).await?;

    // Initialize services
    info!("Initializing services...");
    let database_service = DatabaseService::new(db_pool);
    let services = Arc::new(ServiceFactory::new(settings, database_service)?);

    spawn_daily_stats_task(services.clone());
    spawn_rate_limit_sweep_task(services.clone());

    info!("ChatBuddy is ready!");
    server::run(services).await?;

    info!("ChatBuddy has been shut down.");
    Ok(())
}

/// Record the daily stats snapshot at startup and then hourly. Recording is
/// idempotent per calendar day, so extra ticks are no-ops.
fn spawn_daily_stats_task(services: Arc<ServiceFactory>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            if let Err(e) = services.analytics.record_daily_stats().await {
                error!(error = %e, "Daily stats snapshot failed");
            }
        }
    });
}

/// Periodically drop idle identities from the rate limiter
fn spawn_rate_limit_sweep_task(services: Arc<ServiceFactory>) {
    let window = Duration::from_secs(services.settings.rate_limit.window_seconds);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(window.max(Duration::from_secs(60)) * 5);
        loop {
            interval.tick().await;
            services.rate_limiter.sweep();
        }
    });
}
