//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub phone_number: String,
    pub name: Option<String>,
    pub is_admin: bool,
    pub is_banned: bool,
    pub banned_by: Option<i64>,
    pub banned_at: Option<DateTime<Utc>>,
    pub ban_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl User {
    /// Display name for replies, falling back to the phone number
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.phone_number)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub phone_number: String,
    pub name: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
}
