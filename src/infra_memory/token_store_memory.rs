use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

/// Process-local `TokenStore`. Identities must be registered up front; the
/// relational backend reads them from the user table instead.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: DashMap<UserId, RefreshToken>,
    identities: DashMap<String, UserId>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, identity: impl Into<String>, user_id: UserId) {
        self.identities.insert(identity.into(), user_id);
    }

    pub fn stored_refresh_token(&self, user_id: UserId) -> Option<RefreshToken> {
        self.tokens.get(&user_id).map(|entry| entry.value().clone())
    }
}

#[async_trait::async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save_refresh_token(
        &self,
        user_id: UserId,
        token: &RefreshToken,
    ) -> Result<(), StoreError> {
        self.tokens.insert(user_id, token.clone());
        Ok(())
    }

    async fn load_refresh_token(&self, user_id: UserId) -> Result<RefreshToken, StoreError> {
        self.stored_refresh_token(user_id).ok_or(StoreError::NotFound)
    }

    async fn clear_refresh_token(&self, user_id: UserId) -> Result<(), StoreError> {
        self.tokens.remove(&user_id);
        Ok(())
    }

    async fn resolve_subject(&self, identity: &str) -> Result<UserId, StoreError> {
        self.identities
            .get(identity)
            .map(|entry| *entry.value())
            .ok_or(StoreError::NotFound)
    }
}
