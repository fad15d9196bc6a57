//! Analytics service implementation
//!
//! Aggregates usage counters from the database for the admin stats
//! command and the web dashboard, and records the once-per-day metric
//! snapshot into `bot_stats`.

use std::time::Instant;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::{CommandCount, DailyCount, TypeCount, UserStats};
use crate::utils::errors::Result;
use crate::utils::helpers::format_uptime;

/// Headline counters shown on the dashboard and in /stats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotOverview {
    pub total_users: i64,
    pub total_messages: i64,
    pub commands_used: i64,
    pub ai_requests: i64,
    pub files_processed: i64,
    pub active_groups: i64,
}

#[derive(Debug, Clone)]
pub struct AnalyticsService {
    db: DatabaseService,
    started_at: Instant,
}

impl AnalyticsService {
    pub fn new(db: DatabaseService) -> Self {
        Self {
            db,
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    pub async fn overview(&self) -> Result<BotOverview> {
        Ok(BotOverview {
            total_users: self.db.users.count().await?,
            total_messages: self.db.messages.count().await?,
            commands_used: self.db.messages.count_commands().await?,
            ai_requests: self.db.ai_requests.count().await?,
            files_processed: self.db.files.count().await?,
            active_groups: self.db.groups.count_active().await?,
        })
    }

    pub async fn user_stats(&self) -> Result<UserStats> {
        Ok(UserStats {
            total: self.db.users.count().await?,
            active_7d: self.db.users.count_active_since_days(7).await?,
            admins: self.db.users.count_admins().await?,
            banned: self.db.users.count_banned().await?,
        })
    }

    pub async fn popular_commands(&self, limit: i64) -> Result<Vec<CommandCount>> {
        self.db.messages.popular_commands(limit).await
    }

    pub async fn daily_message_counts(&self, days: i64) -> Result<Vec<DailyCount>> {
        self.db.messages.daily_counts(days).await
    }

    pub async fn message_type_counts(&self) -> Result<Vec<TypeCount>> {
        self.db.messages.type_counts().await
    }

    /// Persist today's metric snapshot. Returns false when today's rows
    /// already exist, so repeated startups and timer ticks are no-ops.
    pub async fn record_daily_stats(&self) -> Result<bool> {
        let today = Utc::now().date_naive();
        let overview = self.overview().await?;
        let metrics = snapshot_metrics(&overview);

        let recorded = self.db.stats.record_snapshot(today, &metrics).await?;
        if recorded {
            info!(date = %today, "Recorded daily stats snapshot");
        } else {
            debug!(date = %today, "Daily stats already recorded");
        }
        Ok(recorded)
    }

    /// Full stats document served by `GET /api/stats`
    pub async fn dashboard_stats(&self) -> Result<serde_json::Value> {
        let overview = self.overview().await?;
        let users = self.user_stats().await?;
        let popular = self.popular_commands(10).await?;
        let daily = self.daily_message_counts(7).await?;
        let types = self.message_type_counts().await?;

        Ok(json!({
            "overview": {
                "total_users": overview.total_users,
                "total_messages": overview.total_messages,
                "commands_used": overview.commands_used,
                "ai_requests": overview.ai_requests,
                "files_processed": overview.files_processed,
                "active_groups": overview.active_groups,
                "uptime": format_uptime(self.uptime()),
            },
            "users": {
                "total": users.total,
                "active_7d": users.active_7d,
                "admins": users.admins,
                "banned": users.banned,
            },
            "popular_commands": popular
                .iter()
                .map(|c| json!({"command": c.command, "count": c.count}))
                .collect::<Vec<_>>(),
            "daily_messages": daily
                .iter()
                .map(|d| json!({"date": d.date.to_string(), "count": d.count}))
                .collect::<Vec<_>>(),
            "message_types": types
                .iter()
                .map(|t| json!({"type": t.message_type, "count": t.count}))
                .collect::<Vec<_>>(),
        }))
    }
}

/// Metric rows written by the daily snapshot
pub fn snapshot_metrics(overview: &BotOverview) -> Vec<(&'static str, i64)> {
    vec![
        ("total_users", overview.total_users),
        ("total_messages", overview.total_messages),
        ("ai_requests", overview.ai_requests),
        ("files_processed", overview.files_processed),
        ("active_groups", overview.active_groups),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_metrics_names_are_stable() {
        let overview = BotOverview {
            total_users: 10,
            total_messages: 200,
            commands_used: 30,
            ai_requests: 40,
            files_processed: 5,
            active_groups: 2,
        };
        let metrics = snapshot_metrics(&overview);
        let names: Vec<_> = metrics.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                "total_users",
                "total_messages",
                "ai_requests",
                "files_processed",
                "active_groups"
            ]
        );
        assert_eq!(metrics[1].1, 200);
    }
}
