//! Services module
//!
//! This module contains business logic services

pub mod ai;
pub mod analytics;
pub mod files;
pub mod whatsapp;

// Re-export commonly used services
pub use ai::{ChatContext, GeminiService};
pub use analytics::{AnalyticsService, BotOverview};
pub use files::{extraction_failed, FileInfo, FileProcessor, FAILURE_MARKER};
pub use whatsapp::{InboundKind, InboundMessage, WebhookPayload, WhatsAppClient};

use std::time::Duration;

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::middleware::{RateLimitConfig, RateLimiter};
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub settings: Settings,
    pub db: DatabaseService,
    pub whatsapp: WhatsAppClient,
    pub ai: GeminiService,
    pub files: FileProcessor,
    pub analytics: AnalyticsService,
    pub rate_limiter: RateLimiter,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: Settings, db: DatabaseService) -> Result<Self> {
        let whatsapp = WhatsAppClient::new(&settings.whatsapp)?;
        let ai = GeminiService::new(&settings.ai)?;
        let files = FileProcessor::new(settings.files.clone());
        let analytics = AnalyticsService::new(db.clone());

        let exempt = if settings.rate_limit.admin_exempt {
            settings.bot.admin_phone.iter().cloned().collect()
        } else {
            Vec::new()
        };
        let rate_limiter = RateLimiter::new(
            RateLimitConfig {
                max_requests: settings.rate_limit.max_requests,
                window: Duration::from_secs(settings.rate_limit.window_seconds),
            },
            exempt,
        );

        Ok(Self {
            settings,
            db,
            whatsapp,
            ai,
            files,
            analytics,
            rate_limiter,
        })
    }
}
