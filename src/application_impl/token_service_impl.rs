use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct TokenTtl {
    pub access: Duration,
    pub refresh: Duration,
}

/// The token lifecycle. Holds nothing but configuration; every transition
/// is a single pass over the store with no internal retries.
pub struct RealTokenService {
    token_codec: Arc<dyn TokenCodec>,
    token_store: Arc<dyn TokenStore>,
    ttl: TokenTtl,
}

impl RealTokenService {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        token_store: Arc<dyn TokenStore>,
        ttl: TokenTtl,
    ) -> Self {
        Self {
            token_codec,
            token_store,
            ttl,
        }
    }

    fn issue_access(&self, user_id: UserId) -> Result<AccessToken, AuthError> {
        self.token_codec
            .issue(user_id, TokenKind::Access, self.ttl.access)
            .map(AccessToken)
            .map_err(codec_failure)
    }

    fn issue_refresh(&self, user_id: UserId) -> Result<RefreshToken, AuthError> {
        self.token_codec
            .issue(user_id, TokenKind::Refresh, self.ttl.refresh)
            .map(RefreshToken)
            .map_err(codec_failure)
    }

    /// Failing to delete a dead token must not mask the authentication result.
    async fn clear_expired(&self, user_id: UserId) {
        if let Err(e) = self.token_store.clear_refresh_token(user_id).await {
            warn!(%user_id, error = %e, "clearing expired refresh token");
        }
    }
}

fn codec_failure(e: CodecError) -> AuthError {
    match e {
        CodecError::Signing(msg) => AuthError::Infrastructure(msg),
        other => AuthError::Unauthenticated(other.to_string()),
    }
}

fn store_failure(e: StoreError) -> AuthError {
    AuthError::Infrastructure(e.to_string())
}

#[async_trait::async_trait]
impl TokenService for RealTokenService {
    async fn generate(&self, identity: &str) -> Result<TokenPair, AuthError> {
        let user_id = match self.token_store.resolve_subject(identity).await {
            Ok(user_id) => user_id,
            Err(StoreError::NotFound) => return Err(AuthError::UnknownSubject),
            Err(e) => return Err(store_failure(e)),
        };

        let refresh_token = self.issue_refresh(user_id)?;
        let access_token = self.issue_access(user_id)?;

        // Supersedes any previous session of this user.
        self.token_store
            .save_refresh_token(user_id, &refresh_token)
            .await
            .map_err(store_failure)?;

        debug!(%user_id, "issued token pair");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    async fn refresh(&self, user_id: UserId) -> Result<AccessToken, AuthError> {
        let stored = match self.token_store.load_refresh_token(user_id).await {
            Ok(token) => token,
            Err(StoreError::NotFound) => {
                return Err(AuthError::Unauthenticated(
                    "no active refresh token".to_string(),
                ));
            }
            Err(e) => return Err(store_failure(e)),
        };

        let token_user_id = match self.token_codec.verify(&stored.0, TokenKind::Refresh) {
            Ok(token_user_id) => token_user_id,
            Err(CodecError::Expired { .. }) => {
                self.clear_expired(user_id).await;
                return Err(AuthError::Unauthenticated(
                    "refresh token expired".to_string(),
                ));
            }
            Err(e) => {
                warn!(%user_id, error = %e, "stored refresh token failed verification");
                return Err(codec_failure(e));
            }
        };

        if token_user_id != user_id {
            warn!(%user_id, %token_user_id, "stored refresh token belongs to another user");
            return Err(AuthError::Unauthenticated(
                "refresh token subject mismatch".to_string(),
            ));
        }

        self.issue_access(user_id)
    }

    async fn refresh_with_token(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<AccessToken, AuthError> {
        let user_id = match self.token_codec.verify(&refresh_token.0, TokenKind::Refresh) {
            Ok(user_id) => user_id,
            Err(CodecError::Expired { user_id }) => {
                // Only the session this token belongs to is cleaned up; a
                // newer login of the same user stays untouched.
                match self.token_store.load_refresh_token(user_id).await {
                    Ok(stored) if stored == *refresh_token => self.clear_expired(user_id).await,
                    Ok(_) | Err(StoreError::NotFound) => {}
                    Err(e) => warn!(%user_id, error = %e, "loading refresh token for cleanup"),
                }
                return Err(AuthError::Unauthenticated(
                    "refresh token expired".to_string(),
                ));
            }
            Err(e) => return Err(codec_failure(e)),
        };

        // A verified token is only redeemable while it is the stored one; a
        // later generate supersedes it.
        match self.token_store.load_refresh_token(user_id).await {
            Ok(stored) if stored == *refresh_token => {}
            Ok(_) => {
                debug!(%user_id, "presented refresh token was superseded");
                return Err(AuthError::Unauthenticated(
                    "refresh token superseded".to_string(),
                ));
            }
            Err(StoreError::NotFound) => {
                return Err(AuthError::Unauthenticated(
                    "no active refresh token".to_string(),
                ));
            }
            Err(e) => return Err(store_failure(e)),
        }

        self.issue_access(user_id)
    }

    async fn invalidate(&self, user_id: UserId) -> Result<(), AuthError> {
        self.token_store
            .clear_refresh_token(user_id)
            .await
            .map_err(store_failure)?;

        debug!(%user_id, "refresh token invalidated");
        Ok(())
    }

    async fn authenticate(&self, access_token: &AccessToken) -> Result<UserId, AuthError> {
        self.token_codec
            .verify(&access_token.0, TokenKind::Access)
            .map_err(codec_failure)
    }
}
