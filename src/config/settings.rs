//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub whatsapp: WhatsAppConfig,
    pub ai: AiConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub files: FilesConfig,
    pub rate_limit: RateLimitSettings,
    pub logging: LoggingConfig,
}

/// Bot identity and command configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    pub admin_phone: Option<String>,
}

/// WhatsApp Cloud API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhatsAppConfig {
    pub phone_id: String,
    pub access_token: String,
    pub verify_token: String,
    pub api_url: String,
}

/// Gemini AI backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    pub api_key: String,
    pub api_url: String,
    pub chat_model: String,
    pub analysis_model: String,
    pub timeout_seconds: u64,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// HTTP server configuration (webhook + dashboard)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// File processing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesConfig {
    pub max_file_size: u64,
    pub supported_extensions: Vec<String>,
    pub supported_image_extensions: Vec<String>,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window_seconds: u64,
    pub admin_exempt: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("CHATBUDDY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ChatBuddyError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "ChatBuddy".to_string(),
                prefix: "/".to_string(),
                admin_phone: None,
            },
            whatsapp: WhatsAppConfig {
                phone_id: String::new(),
                access_token: String::new(),
                verify_token: "change_me".to_string(),
                api_url: "https://graph.facebook.com/v19.0".to_string(),
            },
            ai: AiConfig {
                api_key: String::new(),
                api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                chat_model: "gemini-2.5-flash".to_string(),
                analysis_model: "gemini-2.5-pro".to_string(),
                timeout_seconds: 60,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/chatbuddy".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            files: FilesConfig {
                max_file_size: 16 * 1024 * 1024,
                supported_extensions: vec![
                    "txt", "html", "htm", "js", "py", "json", "csv", "md", "xml", "yaml", "yml",
                    "log", "css", "java", "cpp", "c", "php", "rb", "go", "rs", "swift",
                ]
                .into_iter()
                .map(String::from)
                .collect(),
                supported_image_extensions: vec!["jpg", "jpeg", "png", "gif", "webp"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
            rate_limit: RateLimitSettings {
                max_requests: 30,
                window_seconds: 60,
                admin_exempt: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "logs".to_string(),
            },
        }
    }
}
