//! Message handlers module
//!
//! The inbound router: every normalized webhook message lands in
//! [`handle_inbound`], which identifies the sender, applies the ban and
//! rate-limit gates, writes the audit row and routes by content type.
//! Processing errors resolve to a single generic reply; nothing inbound
//! can crash the worker task.

pub mod ai_pipeline;

use tracing::{debug, error, warn};

use crate::handlers::commands::{self, parse_command};
use crate::handlers::{callbacks, replies};
use crate::middleware::AdmitDecision;
use crate::models::CreateMessageRequest;
use crate::services::{InboundKind, InboundMessage, ServiceFactory};
use crate::utils::errors::Result;

/// Where a message goes after classification
#[derive(Debug, Clone, PartialEq)]
pub enum MessageRoute {
    Command { name: String, args: String },
    Chat(String),
    Image {
        media_id: String,
        mime_type: String,
        caption: Option<String>,
    },
    Document {
        media_id: String,
        filename: String,
    },
    Button(String),
    Unsupported(String),
}

/// Classify a normalized message. Text starting with the command prefix is
/// a command; documents with unsupported extensions are rejected here so
/// they never reach the download path.
pub fn classify(services: &ServiceFactory, kind: &InboundKind) -> MessageRoute {
    let prefix = &services.settings.bot.prefix;
    match kind {
        InboundKind::Text(text) => match parse_command(text, prefix) {
            Some((name, args)) => MessageRoute::Command { name, args },
            None => MessageRoute::Chat(text.clone()),
        },
        InboundKind::Image {
            media_id,
            mime_type,
            caption,
        } => MessageRoute::Image {
            media_id: media_id.clone(),
            mime_type: mime_type.clone(),
            caption: caption.clone(),
        },
        InboundKind::Document { media_id, filename } => {
            if services.files.is_supported_file(filename) {
                MessageRoute::Document {
                    media_id: media_id.clone(),
                    filename: filename.clone(),
                }
            } else {
                MessageRoute::Unsupported(format!("document:{}", filename))
            }
        }
        InboundKind::Button { data } => MessageRoute::Button(data.clone()),
        InboundKind::Other(message_type) => MessageRoute::Unsupported(message_type.clone()),
    }
}

/// Audit-row fields for a classified message
fn audit_fields(route: &MessageRoute) -> (String, bool, Option<String>, Option<String>) {
    match route {
        MessageRoute::Command { name, args } => (
            "command".to_string(),
            true,
            Some(name.clone()),
            Some(format!("{} {}", name, args).trim().to_string()),
        ),
        MessageRoute::Chat(text) => ("text".to_string(), false, None, Some(text.clone())),
        MessageRoute::Image { caption, .. } => ("image".to_string(), false, None, caption.clone()),
        MessageRoute::Document { filename, .. } => {
            ("document".to_string(), false, None, Some(filename.clone()))
        }
        MessageRoute::Button(data) => ("button".to_string(), false, None, Some(data.clone())),
        MessageRoute::Unsupported(kind) => ("unsupported".to_string(), false, None, Some(kind.clone())),
    }
}

/// Entry point for one inbound message. Never returns an error: failures
/// are logged and answered with the generic fallback reply, best effort.
pub async fn handle_inbound(services: &ServiceFactory, inbound: InboundMessage) {
    let from = inbound.from.clone();
    if let Err(e) = process_inbound(services, inbound).await {
        error!(phone = %from, error = %e, severity = %e.severity(), "Message processing failed");
        if let Err(send_err) = services
            .whatsapp
            .send_text(&from, &replies::something_went_wrong())
            .await
        {
            error!(phone = %from, error = %send_err, "Fallback reply failed");
        }
    }
}

async fn process_inbound(services: &ServiceFactory, inbound: InboundMessage) -> Result<()> {
    let settings = &services.settings;
    let user = services
        .db
        .get_or_create_user(
            &inbound.from,
            inbound.sender_name.as_deref(),
            settings.bot.admin_phone.as_deref(),
        )
        .await?;

    // Banned senders get one reply and no audit row
    if user.is_banned {
        debug!(phone = %user.phone_number, "Rejected message from banned user");
        return services
            .whatsapp
            .send_text(
                &user.phone_number,
                &replies::banned(settings.bot.admin_phone.as_deref()),
            )
            .await;
    }

    if let AdmitDecision::Rejected { retry_after } =
        services.rate_limiter.admit(&user.phone_number)
    {
        return services
            .whatsapp
            .send_text(
                &user.phone_number,
                &replies::rate_limited(retry_after.as_secs()),
            )
            .await;
    }

    let group_db_id = match &inbound.group_id {
        Some(gid) => Some(services.db.groups.get_or_create(gid).await?.id),
        None => None,
    };

    let route = classify(services, &inbound.kind);

    // Audit before routing; a duplicate delivery is dropped by the unique
    // message_id constraint, an insert failure must not block the reply
    let (message_type, is_command, command_name, content) = audit_fields(&route);
    let audit = CreateMessageRequest {
        message_id: inbound.id.clone(),
        user_id: user.id,
        group_id: group_db_id,
        content,
        message_type,
        is_command,
        command_name,
    };
    if let Err(e) = services.db.messages.create(audit).await {
        warn!(message_id = %inbound.id, error = %e, "Failed to persist message audit row");
    }

    match route {
        MessageRoute::Command { name, args } => {
            commands::handle_command(services, &user, &inbound.id, &name, &args).await
        }
        MessageRoute::Chat(text) => {
            ai_pipeline::handle_chat(services, &user, &inbound.id, &text).await
        }
        MessageRoute::Image {
            media_id,
            mime_type,
            caption,
        } => {
            ai_pipeline::handle_image(
                services,
                &user,
                &inbound.id,
                &media_id,
                &mime_type,
                caption.as_deref(),
            )
            .await
        }
        MessageRoute::Document { media_id, filename } => {
            ai_pipeline::handle_document(services, &user, &inbound.id, &media_id, &filename).await
        }
        MessageRoute::Button(data) => callbacks::handle_callback(services, &user, &data).await,
        MessageRoute::Unsupported(kind) => {
            debug!(kind = %kind, "Unsupported message type");
            let reply = if kind.starts_with("document:") {
                replies::unsupported_file(&settings.files.supported_extensions)
            } else {
                replies::unsupported_message_type()
            };
            services.whatsapp.send_text(&user.phone_number, &reply).await
        }
    }
}
