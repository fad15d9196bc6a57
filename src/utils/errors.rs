//! Error handling for ChatBuddy
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for ChatBuddy application
#[derive(Error, Debug)]
pub enum ChatBuddyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("WhatsApp API error: {0}")]
    Transport(#[from] TransportError),

    #[error("AI backend error: {0}")]
    Ai(#[from] AiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {phone}")]
    UserNotFound { phone: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// WhatsApp Cloud API specific errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Media download failed: {0}")]
    MediaDownloadFailed(String),

    #[error("Transport timeout")]
    Timeout,

    #[error("Invalid transport response: {0}")]
    InvalidResponse(String),
}

/// Gemini backend specific errors
#[derive(Error, Debug)]
pub enum AiError {
    #[error("AI request failed: {0}")]
    RequestFailed(String),

    #[error("AI backend timeout")]
    Timeout,

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Invalid AI response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for ChatBuddy operations
pub type Result<T> = std::result::Result<T, ChatBuddyError>;

impl ChatBuddyError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ChatBuddyError::Database(_) => false,
            ChatBuddyError::Migration(_) => false,
            ChatBuddyError::Transport(_) => true,
            ChatBuddyError::Ai(_) => true,
            ChatBuddyError::Config(_) => false,
            ChatBuddyError::PermissionDenied(_) => false,
            ChatBuddyError::UserNotFound { .. } => false,
            ChatBuddyError::Http(_) => true,
            ChatBuddyError::Serialization(_) => false,
            ChatBuddyError::Io(_) => true,
            ChatBuddyError::UrlParse(_) => false,
            ChatBuddyError::RateLimitExceeded { .. } => true,
            ChatBuddyError::InvalidInput(_) => false,
            ChatBuddyError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ChatBuddyError::Database(_) => ErrorSeverity::Critical,
            ChatBuddyError::Migration(_) => ErrorSeverity::Critical,
            ChatBuddyError::Config(_) => ErrorSeverity::Critical,
            ChatBuddyError::PermissionDenied(_) => ErrorSeverity::Warning,
            ChatBuddyError::RateLimitExceeded { .. } => ErrorSeverity::Warning,
            ChatBuddyError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
