//! Ownership checks for category and tag references.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use taskdeck_core::{Error, OwnershipValidator, OwnerId, Result};

pub struct PgOwnershipValidator {
    pool: Pool<Postgres>,
}

impl PgOwnershipValidator {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnershipValidator for PgOwnershipValidator {
    async fn category_owned_by(&self, category_id: i64, owner: OwnerId) -> Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND user_id = $2) AS owned",
        )
        .bind(category_id)
        .bind(owner)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.get("owned"))
    }

    async fn tags_owned_by(&self, tag_ids: &[i64], owner: OwnerId) -> Result<bool> {
        let mut distinct = tag_ids.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.is_empty() {
            return Ok(true);
        }

        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM tags WHERE id = ANY($1) AND user_id = $2",
        )
        .bind(&distinct)
        .bind(owner)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        let owned: i64 = row.get("n");
        Ok(owned == distinct.len() as i64)
    }
}
