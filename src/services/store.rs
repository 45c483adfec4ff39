use async_trait::async_trait;
use thiserror::Error;
use crate::models::{NewUser, UserId, UserPatch, UserProfile};

/// Errors that can occur when reading or writing user records
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),
}

/// Persistence collaborator for user profiles
///
/// Every profile returned carries its interests fully resolved, so callers
/// can score without further lookups.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch one user
    async fn get_user(&self, id: UserId) -> Result<Option<UserProfile>, StoreError>;

    /// Fetch every user except `excluding`, in id order
    async fn list_other_users(&self, excluding: UserId) -> Result<Vec<UserProfile>, StoreError>;

    /// Fetch a window of users in id order
    async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<UserProfile>, StoreError>;

    /// Insert a user; emails are unique
    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError>;

    /// Apply a partial update, `None` if the user does not exist
    async fn update_user(&self, id: UserId, patch: &UserPatch) -> Result<Option<UserProfile>, StoreError>;

    /// Delete a user and their interests, `false` if nothing was deleted
    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
