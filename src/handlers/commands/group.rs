//! Group moderation command handlers
//!
//! The Cloud API offers no group management endpoints, so these commands
//! acknowledge the action and record it without touching group membership.

use crate::models::User;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::helpers::extract_mentioned_user;
use crate::utils::logging::log_admin_action;

/// Handle the group moderation commands (/kick, /mute, /unmute, /promote,
/// /demote)
pub async fn handle_group_command(
    services: &ServiceFactory,
    admin: &User,
    name: &str,
    args: &str,
) -> Result<()> {
    let reply_to = &admin.phone_number;

    let Some(target) = extract_mentioned_user(args) else {
        let usage = format!(
            "Usage: {}{} <@name|phone>",
            services.settings.bot.prefix, name
        );
        return services.whatsapp.send_text(reply_to, &usage).await;
    };

    log_admin_action(&admin.phone_number, name, Some(&target), None);

    let text = acknowledgement(name, &target);
    services.whatsapp.send_text(reply_to, &text).await
}

fn acknowledgement(name: &str, target: &str) -> String {
    match name {
        "kick" => format!("👢 {} would be removed from the group. Group management is not available over the Cloud API, so this action was recorded only.", target),
        "mute" => format!("🔇 {} would be muted. Group management is not available over the Cloud API, so this action was recorded only.", target),
        "unmute" => format!("🔊 {} would be unmuted. Group management is not available over the Cloud API, so this action was recorded only.", target),
        "promote" => format!("⭐ {} would be promoted to group admin. Group management is not available over the Cloud API, so this action was recorded only.", target),
        "demote" => format!("⬇️ {} would be demoted. Group management is not available over the Cloud API, so this action was recorded only.", target),
        other => format!("Recorded group action '{}' for {}.", other, target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acknowledgement_names_target() {
        for cmd in ["kick", "mute", "unmute", "promote", "demote"] {
            let text = acknowledgement(cmd, "alice");
            assert!(text.contains("alice"), "{}", cmd);
            assert!(text.contains("recorded only"), "{}", cmd);
        }
    }
}
