//! File processing log repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::file_processing::CreateFileProcessingLog;
use crate::utils::errors::ChatBuddyError;

#[derive(Debug, Clone)]
pub struct FileProcessingRepository {
    pool: PgPool,
}

impl FileProcessingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a file processing log row
    pub async fn create(&self, log: CreateFileProcessingLog) -> Result<(), ChatBuddyError> {
        sqlx::query(
            r#"
            INSERT INTO file_processing (user_id, filename, file_type, file_size, content_extracted, ai_analyzed, processing_time, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(log.user_id)
        .bind(log.filename)
        .bind(log.file_type)
        .bind(log.file_size)
        .bind(log.content_extracted)
        .bind(log.ai_analyzed)
        .bind(log.processing_time)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Count processed files
    pub async fn count(&self) -> Result<i64, ChatBuddyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM file_processing")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
