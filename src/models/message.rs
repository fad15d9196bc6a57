//! Message audit model
//!
//! Messages are write-once audit rows, persisted for every non-banned sender.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageRecord {
    pub id: i64,
    pub message_id: String,
    pub user_id: i64,
    pub group_id: Option<i64>,
    pub content: Option<String>,
    pub message_type: String,
    pub is_command: bool,
    pub command_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub message_id: String,
    pub user_id: i64,
    pub group_id: Option<i64>,
    pub content: Option<String>,
    pub message_type: String,
    pub is_command: bool,
    pub command_name: Option<String>,
}
