//! Gemini AI service implementation
//!
//! Wraps the Generative Language REST API for three workloads: chat
//! replies, image analysis (inline base64 upload) and extracted-file
//! analysis. Chat uses the fast model; analysis uses the stronger one.

use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::settings::AiConfig;
use crate::models::User;
use crate::utils::errors::AiError;

const SYSTEM_PERSONA: &str = "You are ChatBuddy, a friendly AI assistant chatting over WhatsApp. \
Be helpful, concise and conversational. Keep replies under 300 words. \
Use plain text with light WhatsApp formatting (*bold*, _italic_) and avoid markdown tables.";

/// Sender details forwarded with chat prompts so the model can
/// personalize its reply
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub name: Option<String>,
    pub phone: String,
    pub is_admin: bool,
}

impl ChatContext {
    /// Prompt prefix identifying the sender
    fn describe(&self) -> String {
        format!(
            "{} (phone: {}{})",
            self.name.as_deref().unwrap_or("unknown"),
            self.phone,
            if self.is_admin { ", admin" } else { "" },
        )
    }
}

impl From<&User> for ChatContext {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            phone: user.phone_number.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiService {
    client: Client,
    api_key: String,
    api_base: String,
    chat_model: String,
    analysis_model: String,
}

impl GeminiService {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("ChatBuddy-Bot/1.0")
            .build()
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.api_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            analysis_model: config.analysis_model.clone(),
        })
    }

    /// Generate a conversational reply to a user's text message
    pub async fn chat_response(
        &self,
        text: &str,
        context: Option<&ChatContext>,
    ) -> Result<String, AiError> {
        let prompt = match context {
            Some(ctx) => format!("Message from {}: {}", ctx.describe(), text),
            None => text.to_string(),
        };
        let request = GenerateRequest::text(&prompt).with_system(SYSTEM_PERSONA);
        self.generate(&self.chat_model, &request).await
    }

    /// Describe and analyze an image, optionally steered by a caption
    pub async fn analyze_image(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
        caption: Option<&str>,
    ) -> Result<String, AiError> {
        let instruction = match caption {
            Some(c) if !c.trim().is_empty() => {
                format!("Analyze this image. The sender asked: {}", c)
            }
            _ => "Describe this image in detail and point out anything notable.".to_string(),
        };

        let data = base64::engine::general_purpose::STANDARD.encode(image_bytes);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::text(&instruction),
                    Part::inline_data(mime_type, &data),
                ],
            }],
            system_instruction: Some(Content {
                parts: vec![Part::text(SYSTEM_PERSONA)],
            }),
        };
        self.generate(&self.analysis_model, &request).await
    }

    /// Analyze text content extracted from an uploaded file
    pub async fn analyze_file_content(
        &self,
        content: &str,
        filename: &str,
        extension: &str,
    ) -> Result<String, AiError> {
        let prompt = format!(
            "Analyze the following {} file named '{}'. Summarize what it contains, \
its structure, and anything important or unusual.\n\n{}",
            extension, filename, content
        );
        let request = GenerateRequest::text(&prompt).with_system(SYSTEM_PERSONA);
        self.generate(&self.analysis_model, &request).await
    }

    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String, AiError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, model, self.api_key
        );
        debug!(model = model, "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Gemini request failed");
            return Err(AiError::RequestFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }
}

// --- Wire types -------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

impl GenerateRequest {
    fn text(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            system_instruction: None,
        }
    }

    fn with_system(mut self, instruction: &str) -> Self {
        self.system_instruction = Some(Content {
            parts: vec![Part::text(instruction)],
        });
        self
    }
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn inline_data(mime_type: &str, data: &str) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}
