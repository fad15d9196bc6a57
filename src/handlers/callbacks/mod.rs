//! Callback handlers module
//!
//! Handles interactive button replies. Button IDs are set by our own
//! outbound messages, so unknown IDs only appear when a stale message is
//! tapped after the button set changed.

use tracing::{debug, warn};

use crate::handlers::commands;
use crate::handlers::replies;
use crate::models::User;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Dispatch a button tap by its callback data
pub async fn handle_callback(services: &ServiceFactory, user: &User, data: &str) -> Result<()> {
    debug!(phone = %user.phone_number, data = data, "Handling button callback");

    match data {
        "start_chat" => {
            services
                .whatsapp
                .send_text(
                    &user.phone_number,
                    "💬 Great! Just send me a message and I'll reply.",
                )
                .await
        }
        "help_menu" => commands::help::handle_help(services, user).await,
        "help_about" => {
            let text = format!(
                "*ℹ️ About ChatBuddy*\n\nVersion {}\nAn AI assistant for WhatsApp, powered by Gemini.",
                crate::VERSION
            );
            services.whatsapp.send_text(&user.phone_number, &text).await
        }
        "admin_stats" | "admin_users" | "admin_broadcast" => {
            // Buttons only appear on the admin panel, but gate anyway in
            // case the panel message outlives a demotion
            if !user.is_admin {
                return services
                    .whatsapp
                    .send_text(&user.phone_number, &replies::access_denied())
                    .await;
            }
            match data {
                "admin_stats" => commands::admin::handle_stats(services, user).await,
                "admin_users" => {
                    let stats = services.analytics.user_stats().await?;
                    let text = format!(
                        "*👥 Users*\n\nTotal: {}\nActive (7d): {}\nAdmins: {}\nBanned: {}",
                        stats.total, stats.active_7d, stats.admins, stats.banned
                    );
                    services.whatsapp.send_text(&user.phone_number, &text).await
                }
                _ => {
                    let usage = format!(
                        "Send {}broadcast <message> to message all users.",
                        services.settings.bot.prefix
                    );
                    services.whatsapp.send_text(&user.phone_number, &usage).await
                }
            }
        }
        other => {
            warn!(data = other, "Unknown callback data");
            let text = format!(
                "That button is no longer active. Send {}help to see what I can do.",
                services.settings.bot.prefix
            );
            services.whatsapp.send_text(&user.phone_number, &text).await
        }
    }
}
