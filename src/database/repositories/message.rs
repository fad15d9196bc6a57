//! Message audit repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::message::CreateMessageRequest;
use crate::models::stats::{CommandCount, DailyCount, TypeCount};
use crate::utils::errors::ChatBuddyError;

#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a message audit row. The transport may redeliver events, so
    /// duplicates on message_id are silently dropped (at-most-once logging).
    pub async fn create(&self, request: CreateMessageRequest) -> Result<(), ChatBuddyError> {
        sqlx::query(
            r#"
            INSERT INTO messages (message_id, user_id, group_id, content, message_type, is_command, command_name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (message_id) DO NOTHING
            "#,
        )
        .bind(request.message_id)
        .bind(request.user_id)
        .bind(request.group_id)
        .bind(request.content)
        .bind(request.message_type)
        .bind(request.is_command)
        .bind(request.command_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Count total messages
    pub async fn count(&self) -> Result<i64, ChatBuddyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Count command messages
    pub async fn count_commands(&self) -> Result<i64, ChatBuddyError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE is_command = TRUE")
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    /// Most frequently used commands
    pub async fn popular_commands(&self, limit: i64) -> Result<Vec<CommandCount>, ChatBuddyError> {
        let rows = sqlx::query_as::<_, CommandCount>(
            r#"
            SELECT command_name AS command, COUNT(id) AS count
            FROM messages
            WHERE is_command = TRUE AND command_name IS NOT NULL
            GROUP BY command_name
            ORDER BY COUNT(id) DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Daily message counts over the trailing N days
    pub async fn daily_counts(&self, days: i64) -> Result<Vec<DailyCount>, ChatBuddyError> {
        let rows = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT created_at::date AS date, COUNT(id) AS count
            FROM messages
            WHERE created_at >= NOW() - make_interval(days => $1::int)
            GROUP BY created_at::date
            ORDER BY created_at::date
            "#,
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Message counts grouped by type
    pub async fn type_counts(&self) -> Result<Vec<TypeCount>, ChatBuddyError> {
        let rows = sqlx::query_as::<_, TypeCount>(
            "SELECT message_type, COUNT(id) AS count FROM messages GROUP BY message_type",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
