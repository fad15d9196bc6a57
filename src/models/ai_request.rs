//! AI request log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Storage caps keeping the append-only log bounded
pub const PROMPT_CAP: usize = 1000;
pub const RESPONSE_CAP: usize = 2000;

/// Type of AI request, stored as text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiRequestType {
    Chat,
    ImageAnalysis,
    FileAnalysis,
}

impl AiRequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiRequestType::Chat => "chat",
            AiRequestType::ImageAnalysis => "image_analysis",
            AiRequestType::FileAnalysis => "file_analysis",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiRequest {
    pub id: i64,
    pub user_id: i64,
    pub request_type: String,
    pub prompt: Option<String>,
    pub response: Option<String>,
    pub processing_time: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAiRequestLog {
    pub user_id: i64,
    pub request_type: AiRequestType,
    pub prompt: String,
    pub response: String,
    pub processing_time: f64,
}
