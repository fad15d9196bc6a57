//! Configuration validation

use tracing::warn;

use super::settings::Settings;
use crate::utils::errors::ChatBuddyError;

/// Validate settings before the application starts.
///
/// The AI backend key is required. WhatsApp credentials are optional so the
/// dashboard and database can run in demo mode without a connected number,
/// matching how the bot is deployed during development.
pub fn validate_settings(settings: &Settings) -> Result<(), ChatBuddyError> {
    if settings.ai.api_key.is_empty() {
        return Err(ChatBuddyError::Config(
            "ai.api_key is required (CHATBUDDY__AI__API_KEY)".to_string(),
        ));
    }

    if settings.bot.prefix.is_empty() {
        return Err(ChatBuddyError::Config(
            "bot.prefix must not be empty".to_string(),
        ));
    }

    if settings.rate_limit.max_requests == 0 {
        return Err(ChatBuddyError::Config(
            "rate_limit.max_requests must be greater than zero".to_string(),
        ));
    }

    if settings.rate_limit.window_seconds == 0 {
        return Err(ChatBuddyError::Config(
            "rate_limit.window_seconds must be greater than zero".to_string(),
        ));
    }

    if settings.database.url.is_empty() {
        return Err(ChatBuddyError::Config(
            "database.url is required".to_string(),
        ));
    }

    if settings.whatsapp.phone_id.is_empty() || settings.whatsapp.access_token.is_empty() {
        warn!("WhatsApp API credentials missing, bot will run in demo mode");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_ai_key_rejected() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_valid_settings_accepted() {
        let mut settings = Settings::default();
        settings.ai.api_key = "test-key".to_string();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let mut settings = Settings::default();
        settings.ai.api_key = "test-key".to_string();
        settings.rate_limit.max_requests = 0;
        assert!(validate_settings(&settings).is_err());
    }
}
