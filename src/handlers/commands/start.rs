//! Start command handler

use tracing::warn;

use crate::models::User;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::logging::log_user_action;

/// Handle /start command
pub async fn handle_start(
    services: &ServiceFactory,
    user: &User,
    message_id: &str,
) -> Result<()> {
    log_user_action(&user.phone_number, "start", None);

    // Celebratory ack, best effort
    if let Err(e) = services
        .whatsapp
        .send_reaction(&user.phone_number, message_id, "🎉")
        .await
    {
        warn!(phone = %user.phone_number, error = %e, "Start reaction failed");
    }

    let text = welcome_text(
        user.display_name(),
        &services.settings.bot.prefix,
        user.is_admin,
    );
    services
        .whatsapp
        .send_buttons(
            &user.phone_number,
            &text,
            &[("start_chat", "💬 Chat with me"), ("help_menu", "📋 Help")],
        )
        .await
}

pub fn welcome_text(display_name: &str, prefix: &str, is_admin: bool) -> String {
    let mut text = format!(
        "*👋 Hey {}, welcome to ChatBuddy!*\n\n\
I'm your AI assistant on WhatsApp. Here's what I can do:\n\n\
💬 Chat — just send me a message\n\
🖼️ Images — send a photo and I'll describe it\n\
📄 Documents — send a text file and I'll analyze it\n\n\
Send {}help anytime to see all commands.",
        display_name, prefix
    );
    if is_admin {
        text.push_str(&format!(
            "\n\n🛠️ You're an administrator — {}admin opens the admin panel.",
            prefix
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_text_personalized() {
        let text = welcome_text("Ada", "/", false);
        assert!(text.contains("Hey Ada"));
        assert!(text.contains("/help"));
        assert!(!text.contains("administrator"));
    }

    #[test]
    fn test_welcome_text_admin_extras() {
        let text = welcome_text("Ada", "/", true);
        assert!(text.contains("/admin"));
    }
}
