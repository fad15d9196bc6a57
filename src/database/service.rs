//! Database service layer
//!
//! This module provides a high-level interface to database operations

use tracing::info;

use crate::database::{
    connection, AiRequestRepository, DatabasePool, FileProcessingRepository, GroupRepository,
    MessageRepository, StatsRepository, UserRepository,
};
use crate::models::{CreateUserRequest, User};
use crate::utils::errors::ChatBuddyError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub users: UserRepository,
    pub groups: GroupRepository,
    pub messages: MessageRepository,
    pub ai_requests: AiRequestRepository,
    pub files: FileProcessingRepository,
    pub stats: StatsRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            groups: GroupRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            ai_requests: AiRequestRepository::new(pool.clone()),
            files: FileProcessingRepository::new(pool.clone()),
            stats: StatsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connectivity check backing the health endpoint
    pub async fn health(&self) -> Result<(), ChatBuddyError> {
        connection::health_check(&self.pool).await
    }

    /// Look up a user by phone, creating the record on first contact.
    ///
    /// Existing users get a last-seen bump and a display-name backfill. The
    /// admin flag is set only at creation, when the phone matches the
    /// configured admin number.
    pub async fn get_or_create_user(
        &self,
        phone: &str,
        name: Option<&str>,
        admin_phone: Option<&str>,
    ) -> Result<User, ChatBuddyError> {
        if let Some(existing) = self.users.find_by_phone(phone).await? {
            return self.users.touch(existing.id, name).await;
        }

        let user = self
            .users
            .create(CreateUserRequest {
                phone_number: phone.to_string(),
                name: name.map(String::from),
                is_admin: admin_phone.is_some_and(|admin| admin == phone),
            })
            .await?;

        info!(phone = phone, "Created new user");
        Ok(user)
    }
}
