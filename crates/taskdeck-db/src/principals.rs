//! API key lookup for bearer authentication.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use taskdeck_core::{Error, OwnerId, PrincipalResolver, Result};

/// Resolves bearer tokens against the `api_keys` table.
///
/// Only the SHA-256 hex digest of a token is ever stored or compared.
pub struct PgPrincipalResolver {
    pool: Pool<Postgres>,
}

impl PgPrincipalResolver {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Hash a secret using SHA256.
    pub fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Store a key for `owner` and return its row id. The plain token is not kept.
    pub async fn register_key(&self, owner: OwnerId, name: &str, token: &str) -> Result<i64> {
        let row = sqlx::query(
            "INSERT INTO api_keys (user_id, key_hash, name) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(owner)
        .bind(Self::hash_secret(token))
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.get("id"))
    }

    /// Deactivate a key. Returns false if no active key matched.
    pub async fn revoke_key(&self, id: i64) -> Result<bool> {
        let result =
            sqlx::query("UPDATE api_keys SET is_active = false WHERE id = $1 AND is_active")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PrincipalResolver for PgPrincipalResolver {
    async fn resolve(&self, token: &str) -> Result<Option<OwnerId>> {
        let row = sqlx::query(
            r#"
            UPDATE api_keys SET last_used_at = now()
            WHERE key_hash = $1
              AND is_active
              AND (expires_at IS NULL OR expires_at > now())
            RETURNING user_id
            "#,
        )
        .bind(Self::hash_secret(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let owner = row.map(|r| r.get::<i64, _>("user_id"));
        if owner.is_none() {
            debug!(subsystem = "database", component = "principals", "Unknown or inactive api key");
        }
        Ok(owner)
    }
}
