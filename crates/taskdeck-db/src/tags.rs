//! Tag repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use taskdeck_core::{
    CreateTagRequest, Error, OwnerId, Result, Tag, TagRepository, UpdateTagRequest,
};

use crate::name_conflict;

const TAG_COLUMNS: &str = "id, user_id, name, color, created_at, updated_at";

/// PostgreSQL implementation of TagRepository.
pub struct PgTagRepository {
    pool: Pool<Postgres>,
}

impl PgTagRepository {
    /// Create a new PgTagRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn tag_from_row(row: &PgRow) -> Tag {
    Tag {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        color: row.get("color"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn list(&self, owner: OwnerId) -> Result<Vec<Tag>> {
        let sql = format!(
            "SELECT {} FROM tags WHERE user_id = $1 ORDER BY name",
            TAG_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.iter().map(tag_from_row).collect())
    }

    async fn get(&self, id: i64, owner: OwnerId) -> Result<Tag> {
        let sql = format!(
            "SELECT {} FROM tags WHERE id = $1 AND user_id = $2",
            TAG_COLUMNS
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .map(|row| tag_from_row(&row))
            .ok_or(Error::TagNotFound(id))
    }

    async fn create(&self, owner: OwnerId, req: &CreateTagRequest) -> Result<Tag> {
        let sql = format!(
            "INSERT INTO tags (user_id, name, color) VALUES ($1, $2, $3) RETURNING {}",
            TAG_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(owner)
            .bind(&req.name)
            .bind(&req.color)
            .fetch_one(&self.pool)
            .await
            .map_err(name_conflict)?;
        Ok(tag_from_row(&row))
    }

    async fn update(&self, id: i64, owner: OwnerId, req: &UpdateTagRequest) -> Result<Tag> {
        // $4 says whether the color key was supplied; $5 is the new value (NULL clears).
        let set_color = !req.color.is_absent();
        let color = req.color.value().map(String::as_str);
        let sql = format!(
            r#"
            UPDATE tags SET
                name = COALESCE($3, name),
                color = CASE WHEN $4 THEN $5 ELSE color END,
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            TAG_COLUMNS
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .bind(&req.name)
            .bind(set_color)
            .bind(color)
            .fetch_optional(&self.pool)
            .await
            .map_err(name_conflict)?
            .map(|row| tag_from_row(&row))
            .ok_or(Error::TagNotFound(id))
    }

    async fn delete(&self, id: i64, owner: OwnerId) -> Result<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::TagNotFound(id));
        }
        Ok(())
    }
}
