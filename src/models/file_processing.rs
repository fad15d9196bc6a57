//! File processing log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileProcessingRecord {
    pub id: i64,
    pub user_id: i64,
    pub filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub content_extracted: bool,
    pub ai_analyzed: bool,
    pub processing_time: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateFileProcessingLog {
    pub user_id: i64,
    pub filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub content_extracted: bool,
    pub ai_analyzed: bool,
    pub processing_time: f64,
}
