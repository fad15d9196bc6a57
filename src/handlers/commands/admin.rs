//! Admin command handlers
//!
//! Moderation and operations commands. The dispatcher has already
//! verified the caller is an admin before any handler here runs.

use tracing::warn;

use crate::models::User;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::helpers::{extract_mentioned_user, format_uptime};
use crate::utils::logging::log_admin_action;

/// Handle /admin command - show the admin panel
pub async fn handle_admin_panel(services: &ServiceFactory, user: &User) -> Result<()> {
    let prefix = &services.settings.bot.prefix;
    let text = format!(
        "*🛠️ Admin Panel*\n\n\
{p}stats — usage statistics\n\
{p}broadcast <text> — message all users\n\
{p}ban <@name|phone> [reason] — ban a user\n\
{p}unban <@name|phone> — lift a ban\n\n\
Group moderation: {p}kick, {p}mute, {p}unmute, {p}promote, {p}demote",
        p = prefix
    );

    services
        .whatsapp
        .send_buttons(
            &user.phone_number,
            &text,
            &[
                ("admin_stats", "📊 Stats"),
                ("admin_users", "👥 Users"),
                ("admin_broadcast", "📢 Broadcast"),
            ],
        )
        .await
}

/// Handle /stats command - show bot statistics
pub async fn handle_stats(services: &ServiceFactory, user: &User) -> Result<()> {
    let overview = services.analytics.overview().await?;
    let users = services.analytics.user_stats().await?;
    let popular = services.analytics.popular_commands(5).await?;

    let mut text = format!(
        "*📊 Bot Statistics*\n\n\
👥 Users: {} total, {} active (7d), {} admins, {} banned\n\
💬 Messages: {} ({} commands)\n\
🤖 AI requests: {}\n\
📄 Files processed: {}\n\
👪 Active groups: {}\n\
⏱️ Uptime: {}",
        users.total,
        users.active_7d,
        users.admins,
        users.banned,
        overview.total_messages,
        overview.commands_used,
        overview.ai_requests,
        overview.files_processed,
        overview.active_groups,
        format_uptime(services.analytics.uptime()),
    );

    if !popular.is_empty() {
        text.push_str("\n\n*Top commands:*");
        for entry in &popular {
            text.push_str(&format!("\n{} — {}", entry.command, entry.count));
        }
    }

    services.whatsapp.send_text(&user.phone_number, &text).await
}

/// Handle /broadcast command - send a message to all non-banned users.
/// Individual send failures are counted, not fatal.
pub async fn handle_broadcast(services: &ServiceFactory, admin: &User, args: &str) -> Result<()> {
    let reply_to = &admin.phone_number;
    if args.trim().is_empty() {
        let usage = format!(
            "Usage: {}broadcast <message>",
            services.settings.bot.prefix
        );
        return services.whatsapp.send_text(reply_to, &usage).await;
    }

    log_admin_action(&admin.phone_number, "broadcast", None, Some(args));

    let body = format!("📢 *Announcement*\n\n{}", args.trim());
    let recipients = services.db.users.list_active_phones().await?;

    let mut sent = 0u32;
    let mut failed = 0u32;
    for phone in recipients.iter().filter(|p| *p != reply_to) {
        match services.whatsapp.send_text(phone, &body).await {
            Ok(()) => sent += 1,
            Err(e) => {
                warn!(phone = %phone, error = %e, "Broadcast delivery failed");
                failed += 1;
            }
        }
    }

    let summary = format!("📢 Broadcast done: {} delivered, {} failed.", sent, failed);
    services.whatsapp.send_text(reply_to, &summary).await
}

/// Pre-flight decision for a ban request. Admins are never bannable, and
/// banning an already-banned user is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanCheck {
    Proceed,
    TargetIsAdmin,
    AlreadyBanned,
}

pub fn ban_check(target: &User) -> BanCheck {
    if target.is_admin {
        BanCheck::TargetIsAdmin
    } else if target.is_banned {
        BanCheck::AlreadyBanned
    } else {
        BanCheck::Proceed
    }
}

/// Pre-flight decision for an unban request; unbanning a user who is not
/// banned is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnbanCheck {
    Proceed,
    NotBanned,
}

pub fn unban_check(target: &User) -> UnbanCheck {
    if target.is_banned {
        UnbanCheck::Proceed
    } else {
        UnbanCheck::NotBanned
    }
}

/// Handle /ban command
pub async fn handle_ban(services: &ServiceFactory, admin: &User, args: &str) -> Result<()> {
    let reply_to = &admin.phone_number;

    let Some(target_ref) = extract_mentioned_user(args) else {
        let usage = format!(
            "Usage: {}ban <@name|phone> [reason]",
            services.settings.bot.prefix
        );
        return services.whatsapp.send_text(reply_to, &usage).await;
    };

    let Some(target) = services.db.users.find_by_phone_or_name(&target_ref).await? else {
        let msg = format!("🔍 No user found matching '{}'.", target_ref);
        return services.whatsapp.send_text(reply_to, &msg).await;
    };

    match ban_check(&target) {
        BanCheck::TargetIsAdmin => {
            return services
                .whatsapp
                .send_text(reply_to, "⛔ Administrators cannot be banned.")
                .await;
        }
        BanCheck::AlreadyBanned => {
            let msg = format!("⚠️ {} is already banned.", target.display_name());
            return services.whatsapp.send_text(reply_to, &msg).await;
        }
        BanCheck::Proceed => {}
    }

    let reason = ban_reason(args, &target_ref);
    let banned = services.db.users.ban(target.id, admin.id, &reason).await?;
    log_admin_action(
        &admin.phone_number,
        "ban",
        Some(&banned.phone_number),
        Some(&reason),
    );

    // Best effort; the ban stands even if the notification can't be delivered
    let notice = format!("🚫 You have been banned.\nReason: {}", reason);
    if let Err(e) = services.whatsapp.send_text(&banned.phone_number, &notice).await {
        warn!(phone = %banned.phone_number, error = %e, "Could not notify banned user");
    }

    let confirmation = format!(
        "✅ Banned {} ({}).\nReason: {}",
        banned.display_name(),
        banned.phone_number,
        reason
    );
    services.whatsapp.send_text(reply_to, &confirmation).await
}

/// Handle /unban command
pub async fn handle_unban(services: &ServiceFactory, admin: &User, args: &str) -> Result<()> {
    let reply_to = &admin.phone_number;

    let Some(target_ref) = extract_mentioned_user(args) else {
        let usage = format!(
            "Usage: {}unban <@name|phone>",
            services.settings.bot.prefix
        );
        return services.whatsapp.send_text(reply_to, &usage).await;
    };

    let Some(target) = services.db.users.find_by_phone_or_name(&target_ref).await? else {
        let msg = format!("🔍 No user found matching '{}'.", target_ref);
        return services.whatsapp.send_text(reply_to, &msg).await;
    };

    if unban_check(&target) == UnbanCheck::NotBanned {
        let msg = format!("⚠️ {} is not banned.", target.display_name());
        return services.whatsapp.send_text(reply_to, &msg).await;
    }

    let unbanned = services.db.users.unban(target.id).await?;
    log_admin_action(
        &admin.phone_number,
        "unban",
        Some(&unbanned.phone_number),
        None,
    );

    let notice = "✅ Your ban has been lifted. Welcome back!";
    if let Err(e) = services.whatsapp.send_text(&unbanned.phone_number, notice).await {
        warn!(phone = %unbanned.phone_number, error = %e, "Could not notify unbanned user");
    }

    let confirmation = format!(
        "✅ Unbanned {} ({}).",
        unbanned.display_name(),
        unbanned.phone_number
    );
    services.whatsapp.send_text(reply_to, &confirmation).await
}

/// Reason text after the target reference, or a default
fn ban_reason(args: &str, target_ref: &str) -> String {
    let after_target = args
        .split_once(target_ref)
        .map(|(_, rest)| rest.trim())
        .unwrap_or("");
    if after_target.is_empty() {
        "No reason given".to_string()
    } else {
        after_target.to_string()
    }
}
