use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::UserId;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub token_service: Arc<dyn TokenService>,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let token_codec: Arc<dyn TokenCodec> =
            Arc::new(JwtHs512Codec::try_new(settings.jwt.key.as_bytes())?);

        let mut pool = None;
        let token_store: Arc<dyn TokenStore> = match settings.store.backend.as_str() {
            "memory" => {
                let store = MemoryTokenStore::new();
                for user in &settings.store.users {
                    store.register(user.email.clone(), UserId(user.id));
                }
                warn!(users = settings.store.users.len(), "using in-memory token store");
                Arc::new(store)
            }
            "mysql" => {
                let mysql = settings
                    .mysql
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("missing [mysql] settings"))?;
                let mysql_pool = MySqlPoolOptions::new()
                    .max_connections(mysql.max_connections)
                    .connect(&mysql.dsn)
                    .await?;
                pool = Some(mysql_pool.clone());
                Arc::new(MySqlTokenStore::new(mysql_pool))
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let identity_verifier: Arc<dyn IdentityVerifier> =
            match settings.identity.backend.as_str() {
                "fake" => Arc::new(FakeIdentityVerifier::new()),
                "google" => Arc::new(GoogleIdentityVerifier::new(
                    settings.identity.google_client_id.clone(),
                    Duration::from_secs(settings.identity.jwks_cache_secs),
                )),
                other => return Err(anyhow::anyhow!("Unknown identity backend: {}", other)),
            };

        let token_service: Arc<dyn TokenService> = Arc::new(RealTokenService::new(
            token_codec,
            token_store,
            TokenTtl {
                access: settings.jwt.access_ttl(),
                refresh: settings.jwt.refresh_ttl(),
            },
        ));

        info!(
            store = %settings.store.backend,
            identity = %settings.identity.backend,
            "server started"
        );

        Ok(Self {
            token_service,
            identity_verifier,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
