//! Group repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::group::{CreateGroupRequest, Group};
use crate::utils::errors::ChatBuddyError;

#[derive(Debug, Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new group
    pub async fn create(&self, request: CreateGroupRequest) -> Result<Group, ChatBuddyError> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (group_id, name, description, is_active, created_at)
            VALUES ($1, $2, $3, TRUE, $4)
            RETURNING id, group_id, name, description, is_active, created_at
            "#,
        )
        .bind(request.group_id)
        .bind(request.name)
        .bind(request.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    /// Find group by transport group identifier
    pub async fn find_by_group_id(&self, group_id: &str) -> Result<Option<Group>, ChatBuddyError> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, group_id, name, description, is_active, created_at FROM groups WHERE group_id = $1",
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    /// Groups are created lazily on first contact
    pub async fn get_or_create(&self, group_id: &str) -> Result<Group, ChatBuddyError> {
        if let Some(group) = self.find_by_group_id(group_id).await? {
            return Ok(group);
        }

        self.create(CreateGroupRequest {
            group_id: group_id.to_string(),
            name: None,
            description: None,
        })
        .await
    }

    /// Count active groups
    pub async fn count_active(&self) -> Result<i64, ChatBuddyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM groups WHERE is_active = TRUE")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
