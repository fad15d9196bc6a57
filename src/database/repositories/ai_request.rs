//! AI request log repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::ai_request::{CreateAiRequestLog, PROMPT_CAP, RESPONSE_CAP};
use crate::utils::errors::ChatBuddyError;
use crate::utils::helpers::truncate_chars;

#[derive(Debug, Clone)]
pub struct AiRequestRepository {
    pool: PgPool,
}

impl AiRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an AI request log row. Prompt and response are truncated to
    /// fixed caps to bound storage.
    pub async fn create(&self, log: CreateAiRequestLog) -> Result<(), ChatBuddyError> {
        sqlx::query(
            r#"
            INSERT INTO ai_requests (user_id, request_type, prompt, response, processing_time, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(log.user_id)
        .bind(log.request_type.as_str())
        .bind(truncate_chars(&log.prompt, PROMPT_CAP))
        .bind(truncate_chars(&log.response, RESPONSE_CAP))
        .bind(log.processing_time)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Count total AI requests
    pub async fn count(&self) -> Result<i64, ChatBuddyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ai_requests")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
