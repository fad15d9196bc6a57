//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the ChatBuddy application.

use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration.
///
/// The returned guard must be kept alive for the lifetime of the process,
/// otherwise buffered file output is lost on shutdown.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "chatbuddy.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(phone: &str, action: &str, details: Option<&str>) {
    info!(
        phone = phone,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log admin moderation actions
pub fn log_admin_action(admin_phone: &str, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin_phone = admin_phone,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}
