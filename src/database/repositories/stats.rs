//! Bot statistics repository implementation

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::utils::errors::ChatBuddyError;

#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether any snapshot rows exist for the given date
    pub async fn exists_for_date(&self, date: NaiveDate) -> Result<bool, ChatBuddyError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM bot_stats WHERE date = $1)")
                .bind(date)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.0)
    }

    /// Record a daily snapshot in one transaction. When rows for the date
    /// already exist the call is a no-op, so the snapshot job is idempotent.
    /// The unique (metric_name, date) index backstops concurrent snapshots.
    pub async fn record_snapshot(
        &self,
        date: NaiveDate,
        metrics: &[(&str, i64)],
    ) -> Result<bool, ChatBuddyError> {
        let mut tx = self.pool.begin().await?;

        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM bot_stats WHERE date = $1)")
                .bind(date)
                .fetch_one(&mut *tx)
                .await?;

        if exists.0 {
            tx.rollback().await?;
            return Ok(false);
        }

        for (name, value) in metrics {
            sqlx::query(
                r#"
                INSERT INTO bot_stats (metric_name, metric_value, date)
                VALUES ($1, $2, $3)
                ON CONFLICT (metric_name, date) DO NOTHING
                "#,
            )
            .bind(name)
            .bind(value)
            .bind(date)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
