use crate::application_port::*;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

pub const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// An unknown key id triggers a refetch, but never more often than this.
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    email: String,
    #[serde(default)]
    email_verified: bool,
}

#[async_trait::async_trait]
pub trait JwksFetcher: Send + Sync {
    async fn fetch_keys(&self) -> Result<JwkSet, IdentityError>;
}

pub struct HttpJwksFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpJwksFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        HttpJwksFetcher {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl JwksFetcher for HttpJwksFetcher {
    async fn fetch_keys(&self) -> Result<JwkSet, IdentityError> {
        self.client
            .get(&self.url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?
            .json::<JwkSet>()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))
    }
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Verifies Google ID tokens (RS256) against Google's published keys.
pub struct GoogleIdentityVerifier {
    client_id: String,
    cache_ttl: Duration,
    cache: RwLock<Option<CachedKeys>>,
    fetcher: Arc<dyn JwksFetcher>,
}

impl GoogleIdentityVerifier {
    pub fn new(client_id: impl Into<String>, cache_ttl: Duration) -> Self {
        Self::with_fetcher(
            client_id,
            cache_ttl,
            Arc::new(HttpJwksFetcher::new(GOOGLE_CERTS_URL)),
        )
    }

    pub fn with_fetcher(
        client_id: impl Into<String>,
        cache_ttl: Duration,
        fetcher: Arc<dyn JwksFetcher>,
    ) -> Self {
        GoogleIdentityVerifier {
            client_id: client_id.into(),
            // Keys younger than the refetch interval are always served from
            // the cache, so a shorter ttl could not be honored.
            cache_ttl: cache_ttl.max(MIN_REFETCH_INTERVAL),
            cache: RwLock::new(None),
            fetcher,
        }
    }

    async fn find_key(&self, kid: &str) -> Result<Jwk, IdentityError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                let age = cached.fetched_at.elapsed();
                if age < self.cache_ttl {
                    if let Some(jwk) = cached.keys.find(kid) {
                        return Ok(jwk.clone());
                    }
                    if age < MIN_REFETCH_INTERVAL {
                        return Err(IdentityError::Rejected(format!("unknown key id {kid}")));
                    }
                }
            }
        }

        let mut cache = self.cache.write().await;
        // Another task may have refreshed the keys while we waited.
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < MIN_REFETCH_INTERVAL {
                return cached
                    .keys
                    .find(kid)
                    .cloned()
                    .ok_or_else(|| IdentityError::Rejected(format!("unknown key id {kid}")));
            }
        }

        let keys = self.fetcher.fetch_keys().await?;
        debug!(count = keys.keys.len(), "fetched identity provider keys");
        let jwk = keys.find(kid).cloned();
        *cache = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        jwk.ok_or_else(|| IdentityError::Rejected(format!("unknown key id {kid}")))
    }
}

#[async_trait::async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityError> {
        let header =
            decode_header(credential).map_err(|e| IdentityError::Rejected(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(IdentityError::Rejected(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::Rejected("missing kid".to_string()))?;

        let jwk = self.find_key(&kid).await?;
        let key =
            DecodingKey::from_jwk(&jwk).map_err(|e| IdentityError::Rejected(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        let claims = decode::<GoogleClaims>(credential, &key, &validation)
            .map_err(|e| IdentityError::Rejected(e.to_string()))?
            .claims;

        if !claims.email_verified {
            return Err(IdentityError::Rejected("email is not verified".to_string()));
        }

        Ok(VerifiedIdentity {
            email: claims.email,
        })
    }
}
