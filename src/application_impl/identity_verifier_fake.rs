use crate::application_port::*;

const FAKE_PREFIX: &str = "fake-id-token:";

#[derive(Debug, Default)]
pub struct FakeIdentityVerifier;

impl FakeIdentityVerifier {
    pub fn new() -> Self {
        Self
    }
}

// Accepts `fake-id-token:<email>` for local runs without an identity provider.
#[async_trait::async_trait]
impl IdentityVerifier for FakeIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityError> {
        match credential.strip_prefix(FAKE_PREFIX) {
            Some(email) if !email.is_empty() => Ok(VerifiedIdentity {
                email: email.to_string(),
            }),
            _ => Err(IdentityError::Rejected("not a fake id token".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_prefixed_email() {
        let identity = FakeIdentityVerifier::new()
            .verify("fake-id-token:ada@example.com")
            .await
            .unwrap();
        assert_eq!(identity.email, "ada@example.com");
    }

    #[tokio::test]
    async fn default_behaves_like_new() {
        let identity = FakeIdentityVerifier::default()
            .verify("fake-id-token:bob@example.com")
            .await
            .unwrap();
        assert_eq!(identity.email, "bob@example.com");
    }

    #[tokio::test]
    async fn rejects_anything_else() {
        let verifier = FakeIdentityVerifier::new();
        for credential in ["ada@example.com", "fake-id-token:", ""] {
            assert!(matches!(
                verifier.verify(credential).await,
                Err(IdentityError::Rejected(_))
            ));
        }
    }
}
