use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use crate::models::{NewUser, UserId, UserPatch, UserProfile};
use crate::services::store::{StoreError, UserStore};

#[derive(Debug, Default)]
struct MemoryState {
    next_id: UserId,
    users: BTreeMap<UserId, UserProfile>,
}

impl MemoryState {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }
}

/// In-process user store
///
/// Used for local development (`database.backend = "memory"`) and tests.
/// Nothing is persisted across restarts.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing profiles, keeping their ids
    pub fn with_profiles(profiles: Vec<UserProfile>) -> Self {
        let next_id = profiles.iter().map(|p| p.id).max().unwrap_or(0);
        let users = profiles.into_iter().map(|p| (p.id, p)).collect();

        Self {
            state: RwLock::new(MemoryState { next_id, users }),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn list_other_users(&self, excluding: UserId) -> Result<Vec<UserProfile>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|user| user.id != excluding)
            .cloned()
            .collect())
    }

    async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<UserProfile>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError> {
        let mut state = self.state.write().await;
        if state.email_taken(&user.email, None) {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        state.next_id += 1;
        let profile = user.into_profile(state.next_id);
        state.users.insert(profile.id, profile.clone());

        tracing::debug!("Created user {} in memory store", profile.id);
        Ok(profile)
    }

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> Result<Option<UserProfile>, StoreError> {
        let mut state = self.state.write().await;
        if let Some(email) = &patch.email {
            if state.email_taken(email, Some(id)) {
                return Err(StoreError::DuplicateEmail(email.clone()));
            }
        }

        let Some(profile) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(profile);

        Ok(Some(profile.clone()))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(self.state.write().await.users.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
