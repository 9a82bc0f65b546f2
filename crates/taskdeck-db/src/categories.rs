//! Category repository and todo counter maintenance.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, instrument};

use taskdeck_core::{
    Category, CategoryCounter, CategoryRepository, CreateCategoryRequest, Error, OwnerId, Result,
    UpdateCategoryRequest,
};

use crate::name_conflict;

const CATEGORY_COLUMNS: &str = "id, user_id, name, color, todos_count, created_at, updated_at";

/// PostgreSQL implementation of CategoryRepository and CategoryCounter.
pub struct PgCategoryRepository {
    pool: Pool<Postgres>,
}

impl PgCategoryRepository {
    /// Create a new PgCategoryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn category_from_row(row: &PgRow) -> Category {
    Category {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        color: row.get("color"),
        todos_count: row.get("todos_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self, owner: OwnerId) -> Result<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE user_id = $1 ORDER BY name",
            CATEGORY_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.iter().map(category_from_row).collect())
    }

    async fn get(&self, id: i64, owner: OwnerId) -> Result<Category> {
        let sql = format!(
            "SELECT {} FROM categories WHERE id = $1 AND user_id = $2",
            CATEGORY_COLUMNS
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .map(|row| category_from_row(&row))
            .ok_or(Error::CategoryNotFound(id))
    }

    async fn create(&self, owner: OwnerId, req: &CreateCategoryRequest) -> Result<Category> {
        let sql = format!(
            "INSERT INTO categories (user_id, name, color) VALUES ($1, $2, $3) RETURNING {}",
            CATEGORY_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(owner)
            .bind(&req.name)
            .bind(&req.color)
            .fetch_one(&self.pool)
            .await
            .map_err(name_conflict)?;
        Ok(category_from_row(&row))
    }

    async fn update(
        &self,
        id: i64,
        owner: OwnerId,
        req: &UpdateCategoryRequest,
    ) -> Result<Category> {
        let sql = format!(
            r#"
            UPDATE categories SET
                name = COALESCE($3, name),
                color = COALESCE($4, color),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .bind(&req.name)
            .bind(&req.color)
            .fetch_optional(&self.pool)
            .await
            .map_err(name_conflict)?
            .map(|row| category_from_row(&row))
            .ok_or(Error::CategoryNotFound(id))
    }

    async fn delete(&self, id: i64, owner: OwnerId) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::CategoryNotFound(id));
        }
        Ok(())
    }
}

// Each adjustment is one UPDATE so concurrent requests cannot lose updates.
#[async_trait]
impl CategoryCounter for PgCategoryRepository {
    async fn increment(&self, category_id: i64) -> Result<()> {
        sqlx::query("UPDATE categories SET todos_count = todos_count + 1 WHERE id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn decrement(&self, category_id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE categories SET todos_count = GREATEST(todos_count - 1, 0) WHERE id = $1",
        )
        .bind(category_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    #[instrument(skip(self), fields(subsystem = "database", component = "category_counter", op = "recalculate", category_id = category_id))]
    async fn recalculate(&self, category_id: i64) -> Result<i32> {
        let row = sqlx::query(
            r#"
            UPDATE categories SET
                todos_count = (SELECT COUNT(*) FROM todos WHERE category_id = $1)::int
            WHERE id = $1
            RETURNING todos_count
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::CategoryNotFound(category_id))?;

        let count: i32 = row.get("todos_count");
        debug!(todos_count = count, "Category counter rebuilt");
        Ok(count)
    }
}
