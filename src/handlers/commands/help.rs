//! Help command handler

use crate::handlers::commands::COMMANDS;
use crate::models::User;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Handle /help command
pub async fn handle_help(services: &ServiceFactory, user: &User) -> Result<()> {
    let text = help_text(&services.settings.bot.prefix, user.is_admin);
    services
        .whatsapp
        .send_buttons(
            &user.phone_number,
            &text,
            &[("start_chat", "💬 Start chatting"), ("help_about", "ℹ️ About")],
        )
        .await
}

/// Build the help text. Admin-only commands appear only for admins.
pub fn help_text(prefix: &str, is_admin: bool) -> String {
    let mut lines = vec![
        "*🤖 ChatBuddy Help*".to_string(),
        String::new(),
        "Send me any text and I'll chat with you. Send an image or a document and I'll analyze it.".to_string(),
        String::new(),
        "*Commands:*".to_string(),
    ];

    for cmd in COMMANDS.iter().filter(|c| !c.requires_admin) {
        lines.push(format!("{}{} — {}", prefix, cmd.name, cmd.description));
    }

    if is_admin {
        lines.push(String::new());
        lines.push("*Admin commands:*".to_string());
        for cmd in COMMANDS.iter().filter(|c| c.requires_admin) {
            lines.push(format!("{}{} — {}", prefix, cmd.name, cmd.description));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_hides_admin_commands_from_users() {
        let text = help_text("/", false);
        assert!(text.contains("/help"));
        assert!(text.contains("/start"));
        assert!(!text.contains("/ban"));
        assert!(!text.contains("Admin commands"));
    }

    #[test]
    fn test_help_shows_admin_commands_to_admins() {
        let text = help_text("/", true);
        assert!(text.contains("Admin commands"));
        assert!(text.contains("/ban"));
        assert!(text.contains("/broadcast"));
    }

    #[test]
    fn test_help_uses_configured_prefix() {
        let text = help_text("!", false);
        assert!(text.contains("!help"));
        assert!(!text.contains("/help"));
    }
}
