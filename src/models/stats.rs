//! Bot statistics models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BotStat {
    pub id: i64,
    pub metric_name: String,
    pub metric_value: i64,
    pub date: NaiveDate,
}

/// Popular command projection
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommandCount {
    pub command: String,
    pub count: i64,
}

/// Daily message histogram entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Per-type message counts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TypeCount {
    pub message_type: String,
    pub count: i64,
}

/// Aggregated user statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total: i64,
    pub active_7d: i64,
    pub admins: i64,
    pub banned: i64,
}
