//! User repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::user::{CreateUserRequest, User};
use crate::utils::errors::ChatBuddyError;

const USER_COLUMNS: &str = "id, phone_number, name, is_admin, is_banned, banned_by, banned_at, ban_reason, created_at, last_seen";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, ChatBuddyError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (phone_number, name, is_admin, created_at, last_seen)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, phone_number, name, is_admin, is_banned, banned_by, banned_at, ban_reason, created_at, last_seen
            "#,
        )
        .bind(request.phone_number)
        .bind(request.name)
        .bind(request.is_admin)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by internal ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, ChatBuddyError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by phone number
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, ChatBuddyError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone_number = $1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a moderation target by phone number or display name.
    ///
    /// Phone matches win over name matches; display names are not unique so
    /// a name lookup takes the oldest matching account.
    pub async fn find_by_phone_or_name(&self, target: &str) -> Result<Option<User>, ChatBuddyError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE phone_number = $1 OR name = $1
            ORDER BY (phone_number = $1) DESC, created_at ASC
            LIMIT 1
            "#
        ))
        .bind(target)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Bump last-seen and backfill the display name when missing
    pub async fn touch(&self, id: i64, name: Option<&str>) -> Result<User, ChatBuddyError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET last_seen = $2,
                name = COALESCE(name, $3)
            WHERE id = $1
            RETURNING id, phone_number, name, is_admin, is_banned, banned_by, banned_at, ban_reason, created_at, last_seen
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Ban a user. The ban flag and audit fields flip in one statement so a
    /// moderation action is never partially applied.
    pub async fn ban(
        &self,
        id: i64,
        banned_by: i64,
        reason: &str,
    ) -> Result<User, ChatBuddyError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_banned = TRUE, banned_by = $2, banned_at = $3, ban_reason = $4
            WHERE id = $1
            RETURNING id, phone_number, name, is_admin, is_banned, banned_by, banned_at, ban_reason, created_at, last_seen
            "#,
        )
        .bind(id)
        .bind(banned_by)
        .bind(Utc::now())
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Unban a user, clearing the audit fields together with the flag
    pub async fn unban(&self, id: i64) -> Result<User, ChatBuddyError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_banned = FALSE, banned_by = NULL, banned_at = NULL, ban_reason = NULL
            WHERE id = $1
            RETURNING id, phone_number, name, is_admin, is_banned, banned_by, banned_at, ban_reason, created_at, last_seen
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Phone numbers of all non-banned users (broadcast recipients)
    pub async fn list_active_phones(&self) -> Result<Vec<String>, ChatBuddyError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT phone_number FROM users WHERE is_banned = FALSE")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(p,)| p).collect())
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64, ChatBuddyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Count users seen within the last N days
    pub async fn count_active_since_days(&self, days: i64) -> Result<i64, ChatBuddyError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE last_seen >= NOW() - make_interval(days => $1::int)",
        )
        .bind(days)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Count admin users
    pub async fn count_admins(&self) -> Result<i64, ChatBuddyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_admin = TRUE")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Count banned users
    pub async fn count_banned(&self) -> Result<i64, ChatBuddyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_banned = TRUE")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
