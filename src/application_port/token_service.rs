use crate::domain_model::*;
use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("user is not registered")]
    UnknownSubject,
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("token is malformed or its signature is invalid")]
    Malformed,
    #[error("token is not a {expected} token")]
    WrongKind { expected: TokenKind },
    #[error("token expired")]
    Expired { user_id: UserId },
    #[error("signing failed: {0}")]
    Signing(String),
}

pub trait TokenCodec: Send + Sync {
    fn issue(&self, user: UserId, kind: TokenKind, ttl: Duration) -> Result<String, CodecError> {
        self.issue_at(user, kind, Utc::now(), ttl)
    }

    fn issue_at(
        &self,
        user: UserId,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, CodecError>;

    /// Returns the embedded subject when the signature, kind and expiry all
    /// check out.
    fn verify(&self, token: &str, kind: TokenKind) -> Result<UserId, CodecError>;
}

#[async_trait::async_trait]
pub trait TokenService: Send + Sync {
    /// Resolve a verified external identity and issue a fresh token pair.
    /// The refresh token supersedes whatever the user held before.
    async fn generate(&self, identity: &str) -> Result<TokenPair, AuthError>;

    /// Mint a new access token from the refresh token stored for `user_id`.
    async fn refresh(&self, user_id: UserId) -> Result<AccessToken, AuthError>;

    /// Validate a caller-presented refresh token, then refresh for its subject.
    async fn refresh_with_token(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<AccessToken, AuthError>;

    async fn invalidate(&self, user_id: UserId) -> Result<(), AuthError>;

    /// Verify a bearer access token.
    async fn authenticate(&self, access_token: &AccessToken) -> Result<UserId, AuthError>;
}
