//! ChatBuddy WhatsApp Bot
//!
//! An AI assistant for WhatsApp built on the Cloud API. This library
//! provides modular components for webhook intake, command dispatch,
//! per-user rate limiting, Gemini-backed chat and media analysis, and
//! usage analytics with a web dashboard.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ChatBuddyError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use middleware::RateLimiter;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
