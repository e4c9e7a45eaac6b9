use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Persistence for the single active refresh token of each user, plus the
/// identity directory used to resolve a verified email to a user.
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// Upsert the refresh token of `user_id`, replacing any previous value.
    async fn save_refresh_token(
        &self,
        user_id: UserId,
        token: &RefreshToken,
    ) -> Result<(), StoreError>;

    /// Fails with `NotFound` when the user holds no refresh token.
    async fn load_refresh_token(&self, user_id: UserId) -> Result<RefreshToken, StoreError>;

    /// Idempotent.
    async fn clear_refresh_token(&self, user_id: UserId) -> Result<(), StoreError>;

    /// Fails with `NotFound` when no user is registered under `identity`.
    async fn resolve_subject(&self, identity: &str) -> Result<UserId, StoreError>;
}
