//! WhatsApp Cloud API service implementation
//!
//! This service wraps the Graph API messaging endpoints: sending text,
//! interactive button messages and reactions, resolving media IDs to
//! download URLs, and fetching media bytes. It also owns the webhook
//! payload types and their normalization into [`InboundMessage`].

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::settings::WhatsAppConfig;
use crate::utils::errors::{Result, TransportError};

/// Maximum reply buttons the Cloud API accepts per interactive message
pub const MAX_BUTTONS: usize = 3;

/// WhatsApp Cloud API client
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    client: Client,
    phone_id: String,
    access_token: String,
    api_base: String,
}

impl WhatsAppClient {
    /// Create a new client from configuration
    pub fn new(config: &WhatsAppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("ChatBuddy-Bot/1.0")
            .build()?;

        Ok(Self {
            client,
            phone_id: config.phone_id.clone(),
            access_token: config.access_token.clone(),
            api_base: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send a plain text message
    pub async fn send_text(&self, to: &str, body: &str) -> Result<()> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": { "preview_url": false, "body": body },
        });
        self.post_message(to, payload).await
    }

    /// Send a text message with up to [`MAX_BUTTONS`] reply buttons.
    /// Extra buttons beyond the API limit are dropped with a warning.
    pub async fn send_buttons(&self, to: &str, body: &str, buttons: &[(&str, &str)]) -> Result<()> {
        if buttons.len() > MAX_BUTTONS {
            warn!(
                to = to,
                requested = buttons.len(),
                "Too many reply buttons, truncating"
            );
        }
        let buttons: Vec<_> = buttons
            .iter()
            .take(MAX_BUTTONS)
            .map(|(id, title)| {
                json!({ "type": "reply", "reply": { "id": id, "title": title } })
            })
            .collect();

        let payload = json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "interactive",
            "interactive": {
                "type": "button",
                "body": { "text": body },
                "action": { "buttons": buttons },
            },
        });
        self.post_message(to, payload).await
    }

    /// React to a message with an emoji
    pub async fn send_reaction(&self, to: &str, message_id: &str, emoji: &str) -> Result<()> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "reaction",
            "reaction": { "message_id": message_id, "emoji": emoji },
        });
        self.post_message(to, payload).await
    }

    async fn post_message(&self, to: &str, payload: serde_json::Value) -> Result<()> {
        let url = format!("{}/{}/messages", self.api_base, self.phone_id);
        debug!(to = to, "Sending WhatsApp message");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::SendFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(
                TransportError::SendFailed(format!("HTTP {}: {}", status, error_text)).into(),
            );
        }

        Ok(())
    }

    /// Resolve a media ID to a short-lived download URL
    pub async fn media_url(&self, media_id: &str) -> Result<String> {
        let url = format!("{}/{}", self.api_base, media_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::MediaDownloadFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(TransportError::MediaDownloadFailed(format!(
                "HTTP {} resolving media {}",
                response.status(),
                media_id
            ))
            .into());
        }

        let media: MediaLookup = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        Ok(media.url)
    }

    /// Download media bytes from a resolved URL
    pub async fn download_media(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::MediaDownloadFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(TransportError::MediaDownloadFailed(format!(
                "HTTP {} downloading media",
                response.status()
            ))
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::MediaDownloadFailed(e.to_string()))?;

        debug!(size = bytes.len(), "Downloaded media");
        Ok(bytes.to_vec())
    }

    /// Fetch a media ID end to end: resolve, then download
    pub async fn fetch_media(&self, media_id: &str) -> Result<Vec<u8>> {
        let url = self.media_url(media_id).await?;
        self.download_media(&url).await
    }
}

#[derive(Debug, Deserialize)]
struct MediaLookup {
    url: String,
}

// --- Webhook payload types -------------------------------------------------

/// Top-level webhook notification from the Cloud API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookEntry {
    pub id: String,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookChange {
    pub field: String,
    pub value: WebhookValue,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookValue {
    pub messaging_product: String,
    #[serde(default)]
    pub contacts: Vec<WebhookContact>,
    #[serde(default)]
    pub messages: Vec<WebhookMessage>,
    #[serde(default)]
    pub statuses: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookContact {
    pub wa_id: String,
    pub profile: Option<ContactProfile>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContactProfile {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookMessage {
    pub id: String,
    pub from: String,
    pub timestamp: Option<String>,
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: Option<TextBody>,
    pub image: Option<MediaBody>,
    pub document: Option<MediaBody>,
    pub interactive: Option<InteractiveBody>,
    /// Set on messages relayed from group conversations
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaBody {
    pub id: String,
    pub mime_type: Option<String>,
    pub filename: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InteractiveBody {
    #[serde(rename = "type")]
    pub interactive_type: String,
    pub button_reply: Option<ButtonReply>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ButtonReply {
    pub id: String,
    pub title: String,
}

// --- Normalized inbound messages -------------------------------------------

/// A single inbound message, decoupled from the webhook wire format
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub id: String,
    pub from: String,
    pub sender_name: Option<String>,
    pub group_id: Option<String>,
    pub kind: InboundKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundKind {
    Text(String),
    Image {
        media_id: String,
        mime_type: String,
        caption: Option<String>,
    },
    Document {
        media_id: String,
        filename: String,
    },
    Button {
        data: String,
    },
    /// Anything we don't handle (audio, video, stickers, locations...)
    Other(String),
}

impl WebhookPayload {
    /// Flatten all entries/changes into normalized messages, pairing each
    /// message with its sender's profile name when the contact block is
    /// present. Status-only notifications yield an empty list.
    pub fn inbound_messages(&self) -> Vec<InboundMessage> {
        let mut out = Vec::new();
        for entry in &self.entry {
            for change in &entry.changes {
                let value = &change.value;
                for msg in &value.messages {
                    let sender_name = value
                        .contacts
                        .iter()
                        .find(|c| c.wa_id == msg.from)
                        .and_then(|c| c.profile.as_ref())
                        .and_then(|p| p.name.clone());
                    out.push(InboundMessage {
                        id: msg.id.clone(),
                        from: msg.from.clone(),
                        sender_name,
                        group_id: msg.group_id.clone(),
                        kind: msg.normalized_kind(),
                    });
                }
            }
        }
        out
    }
}

impl WebhookMessage {
    fn normalized_kind(&self) -> InboundKind {
        match self.message_type.as_str() {
            "text" => match &self.text {
                Some(t) => InboundKind::Text(t.body.clone()),
                None => InboundKind::Other("text".to_string()),
            },
            "image" => match &self.image {
                Some(m) => InboundKind::Image {
                    media_id: m.id.clone(),
                    mime_type: m
                        .mime_type
                        .clone()
                        .unwrap_or_else(|| "image/jpeg".to_string()),
                    caption: m.caption.clone(),
                },
                None => InboundKind::Other("image".to_string()),
            },
            "document" => match &self.document {
                Some(m) => InboundKind::Document {
                    media_id: m.id.clone(),
                    filename: m
                        .filename
                        .clone()
                        .unwrap_or_else(|| "document".to_string()),
                },
                None => InboundKind::Other("document".to_string()),
            },
            "interactive" => match self
                .interactive
                .as_ref()
                .and_then(|i| i.button_reply.as_ref())
            {
                Some(reply) => InboundKind::Button {
                    data: reply.id.clone(),
                },
                None => InboundKind::Other("interactive".to_string()),
            },
            other => InboundKind::Other(other.to_string()),
        }
    }
}
