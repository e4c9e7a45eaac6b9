#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity credential rejected: {0}")]
    Rejected(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
}

/// Exchanges a credential issued by an external identity provider for a
/// verified email address.
#[async_trait::async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityError>;
}
