//! User-facing reply texts
//!
//! Every canned reply the bot can send lives here, keyed by outcome.
//! Handlers return results; the dispatcher and router map failure
//! outcomes to exactly one of these messages, so wording stays
//! consistent and testable.

/// Reply sent to banned users on any interaction
pub fn banned(admin_phone: Option<&str>) -> String {
    match admin_phone {
        Some(phone) => format!(
            "🚫 You are banned from using this bot.\n\nContact the administrator at {} if you believe this is a mistake.",
            phone
        ),
        None => "🚫 You are banned from using this bot.".to_string(),
    }
}

/// Reply for non-admins invoking admin-only commands
pub fn access_denied() -> String {
    "⛔ This command is only available to administrators.".to_string()
}

/// Reply for unrecognized commands
pub fn unknown_command(prefix: &str) -> String {
    format!(
        "❓ Unknown command. Send {}help to see what I can do.",
        prefix
    )
}

/// Reply when the sender is rate limited
pub fn rate_limited(retry_after_secs: u64) -> String {
    format!(
        "⏳ You're sending messages too quickly. Please wait {} seconds and try again.",
        retry_after_secs.max(1)
    )
}

/// Fallback when the AI backend fails on a chat message
pub fn ai_unavailable() -> String {
    "🤖 I'm having trouble thinking right now. Please try again in a moment.".to_string()
}

/// Fallback when image analysis fails
pub fn image_analysis_failed() -> String {
    "👁️ I couldn't analyze that image. Please try again later.".to_string()
}

/// Fallback when file analysis fails
pub fn file_analysis_failed() -> String {
    "📄 I couldn't analyze that file. Please try again later.".to_string()
}

/// Reply when media could not be downloaded from WhatsApp
pub fn media_download_failed() -> String {
    "📥 I couldn't download that attachment. Please try sending it again.".to_string()
}

/// Generic reply when a command handler fails
pub fn command_failed() -> String {
    "⚠️ Something went wrong executing that command. Please try again.".to_string()
}

/// Outermost fallback for unexpected processing errors
pub fn something_went_wrong() -> String {
    "⚠️ Something went wrong. Please try again.".to_string()
}

/// Reply for message types the bot does not handle
pub fn unsupported_message_type() -> String {
    "🤷 I can only handle text, images and documents right now.".to_string()
}

/// Reply for documents with unsupported extensions
pub fn unsupported_file(supported: &[String]) -> String {
    format!(
        "📎 I can't read that file type. Supported types: {}",
        supported.join(", ")
    )
}

/// Ack while analyzing an image
pub fn analyzing_image() -> String {
    "👁️ Analyzing your image...".to_string()
}

/// Ack while processing an uploaded document
pub fn processing_file(filename: &str) -> String {
    format!("📄 Processing *{}*...", filename)
}
