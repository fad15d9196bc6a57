//! Command handlers module
//!
//! This module contains handlers for all bot commands like /start, /help,
//! etc., plus the dispatcher that parses, gates and routes them.

pub mod admin;
pub mod group;
pub mod help;
pub mod start;

use tracing::{error, info};

use crate::handlers::replies;
use crate::models::User;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Static description of a bot command
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub requires_admin: bool,
}

/// All available bot commands. Admin requirements are declared here, not
/// checked inside individual handlers.
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "start",
        description: "Start the bot and show welcome message",
        requires_admin: false,
    },
    CommandSpec {
        name: "help",
        description: "Show help information",
        requires_admin: false,
    },
    CommandSpec {
        name: "admin",
        description: "Admin panel",
        requires_admin: true,
    },
    CommandSpec {
        name: "stats",
        description: "Show bot statistics",
        requires_admin: true,
    },
    CommandSpec {
        name: "broadcast",
        description: "Send a message to all users",
        requires_admin: true,
    },
    CommandSpec {
        name: "ban",
        description: "Ban a user",
        requires_admin: true,
    },
    CommandSpec {
        name: "unban",
        description: "Unban a user",
        requires_admin: true,
    },
    CommandSpec {
        name: "kick",
        description: "Remove a user from the group",
        requires_admin: true,
    },
    CommandSpec {
        name: "mute",
        description: "Mute a user in the group",
        requires_admin: true,
    },
    CommandSpec {
        name: "unmute",
        description: "Unmute a user in the group",
        requires_admin: true,
    },
    CommandSpec {
        name: "promote",
        description: "Promote a user to group admin",
        requires_admin: true,
    },
    CommandSpec {
        name: "demote",
        description: "Demote a group admin",
        requires_admin: true,
    },
];

pub fn find_command(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|c| c.name == name)
}

/// Parse `text` as a command invocation. Returns the lowercased command
/// name and the untouched argument remainder, or None when the text does
/// not start with the configured prefix.
pub fn parse_command(text: &str, prefix: &str) -> Option<(String, String)> {
    let rest = text.trim().strip_prefix(prefix)?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next()?.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }
    let args = parts.next().unwrap_or("").trim().to_string();
    Some((name, args))
}

/// Outcome of the pre-dispatch gate checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGate {
    Proceed,
    Banned,
    AccessDenied,
    Unknown,
}

/// Gate a command invocation. Checks run in a fixed order: banned senders
/// are rejected first, then admin requirements, then command existence.
pub fn gate(user: &User, name: &str) -> CommandGate {
    if user.is_banned {
        return CommandGate::Banned;
    }
    match find_command(name) {
        Some(spec) if spec.requires_admin && !user.is_admin => CommandGate::AccessDenied,
        Some(_) => CommandGate::Proceed,
        None => CommandGate::Unknown,
    }
}

/// Main command dispatcher.
///
/// Gate rejections and handler faults both resolve to a single reply from
/// the fixed table; a failing handler never escapes this function.
pub async fn handle_command(
    services: &ServiceFactory,
    user: &User,
    message_id: &str,
    name: &str,
    args: &str,
) -> Result<()> {
    let prefix = &services.settings.bot.prefix;
    let reply_to = &user.phone_number;

    match gate(user, name) {
        CommandGate::Banned => {
            return services
                .whatsapp
                .send_text(
                    reply_to,
                    &replies::banned(services.settings.bot.admin_phone.as_deref()),
                )
                .await;
        }
        CommandGate::AccessDenied => {
            info!(phone = %user.phone_number, command = name, "Admin command denied");
            return services
                .whatsapp
                .send_text(reply_to, &replies::access_denied())
                .await;
        }
        CommandGate::Unknown => {
            return services
                .whatsapp
                .send_text(reply_to, &replies::unknown_command(prefix))
                .await;
        }
        CommandGate::Proceed => {}
    }

    info!(phone = %user.phone_number, command = name, "Executing command");

    let outcome = match name {
        "start" => start::handle_start(services, user, message_id).await,
        "help" => help::handle_help(services, user).await,
        "admin" => admin::handle_admin_panel(services, user).await,
        "stats" => admin::handle_stats(services, user).await,
        "broadcast" => admin::handle_broadcast(services, user, args).await,
        "ban" => admin::handle_ban(services, user, args).await,
        "unban" => admin::handle_unban(services, user, args).await,
        "kick" | "mute" | "unmute" | "promote" | "demote" => {
            group::handle_group_command(services, user, name, args).await
        }
        // Unreachable: gate() already mapped unregistered names to Unknown
        _ => return Ok(()),
    };

    if let Err(e) = outcome {
        error!(command = name, error = %e, "Command handler failed");
        services
            .whatsapp
            .send_text(reply_to, &replies::command_failed())
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user(is_admin: bool, is_banned: bool) -> User {
        User {
            id: 1,
            phone_number: "+15550001111".to_string(),
            name: Some("Ada".to_string()),
            is_admin,
            is_banned,
            banned_by: None,
            banned_at: None,
            ban_reason: None,
            created_at: Utc::now(),
            last_seen: Utc::now(),
        }
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(
            parse_command("/ban @alice spamming", "/"),
            Some(("ban".to_string(), "@alice spamming".to_string()))
        );
        assert_eq!(
            parse_command("/HELP", "/"),
            Some(("help".to_string(), String::new()))
        );
        assert_eq!(parse_command("hello there", "/"), None);
        assert_eq!(parse_command("/", "/"), None);
        assert_eq!(
            parse_command("!stats", "!"),
            Some(("stats".to_string(), String::new()))
        );
    }

    #[test]
    fn test_gate_banned_wins_over_everything() {
        let banned_admin = test_user(true, true);
        assert_eq!(gate(&banned_admin, "help"), CommandGate::Banned);
        assert_eq!(gate(&banned_admin, "nonsense"), CommandGate::Banned);
    }

    #[test]
    fn test_gate_admin_requirement() {
        let user = test_user(false, false);
        let admin = test_user(true, false);
        assert_eq!(gate(&user, "ban"), CommandGate::AccessDenied);
        assert_eq!(gate(&user, "broadcast"), CommandGate::AccessDenied);
        assert_eq!(gate(&admin, "ban"), CommandGate::Proceed);
        assert_eq!(gate(&user, "help"), CommandGate::Proceed);
    }

    #[test]
    fn test_gate_unknown_command() {
        let user = test_user(false, false);
        assert_eq!(gate(&user, "frobnicate"), CommandGate::Unknown);
    }

    #[test]
    fn test_registry_admin_flags() {
        assert!(!find_command("help").unwrap().requires_admin);
        assert!(!find_command("start").unwrap().requires_admin);
        for name in ["admin", "stats", "broadcast", "ban", "unban", "kick"] {
            assert!(find_command(name).unwrap().requires_admin, "{}", name);
        }
        assert!(find_command("bogus").is_none());
    }
}
