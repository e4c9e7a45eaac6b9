use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlTokenStore {
    pool: MySqlPool,
}

impl MySqlTokenStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlTokenStore { pool }
    }

    #[inline]
    fn backend(e: sqlx::Error) -> StoreError {
        StoreError::Backend(e.to_string())
    }
}

#[async_trait::async_trait]
impl TokenStore for MySqlTokenStore {
    async fn save_refresh_token(
        &self,
        user_id: UserId,
        token: &RefreshToken,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
INSERT INTO refresh_token (user_id, token)
VALUES (?, ?)
ON DUPLICATE KEY UPDATE token = VALUES(token), updated_at = CURRENT_TIMESTAMP(6)
"#,
        )
        .bind(user_id)
        .bind(&token.0)
        .execute(&self.pool)
        .await
        .map_err(Self::backend)?;

        Ok(())
    }

    async fn load_refresh_token(&self, user_id: UserId) -> Result<RefreshToken, StoreError> {
        let row_opt: Option<MySqlRow> =
            sqlx::query("SELECT token FROM refresh_token WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Self::backend)?;

        let row = row_opt.ok_or(StoreError::NotFound)?;
        let token: String = row.try_get("token").map_err(Self::backend)?;
        Ok(RefreshToken(token))
    }

    async fn clear_refresh_token(&self, user_id: UserId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM refresh_token WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Self::backend)?;

        Ok(())
    }

    async fn resolve_subject(&self, identity: &str) -> Result<UserId, StoreError> {
        if let Some(row) = sqlx::query("SELECT id FROM user WHERE email = ?")
            .bind(identity)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("query user id: {e}")))?
        {
            return row.try_get::<UserId, _>("id").map_err(Self::backend);
        }

        Err(StoreError::NotFound)
    }
}
