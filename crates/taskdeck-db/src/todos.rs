//! Todo repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Pool, Postgres, Row};
use tracing::{debug, instrument};

use taskdeck_core::{
    CategorySummary, Error, NewTodo, OwnerId, PositionUpdate, Priority, Result, Status,
    TagSummary, Todo, TodoRepository, TodoWithRelations,
};

/// Columns selected for every todo read, in `todo_from_row` order.
pub(crate) const TODO_COLUMNS: &str = "t.id, t.user_id, t.category_id, t.title, t.description, \
     t.completed, t.position, t.priority, t.status, t.due_date, t.created_at, t.updated_at";

/// Display order for listings.
const LIST_ORDER: &str = "COALESCE(t.position, 0) ASC, t.created_at DESC";

/// PostgreSQL implementation of TodoRepository.
pub struct PgTodoRepository {
    pool: Pool<Postgres>,
}

impl PgTodoRepository {
    /// Create a new PgTodoRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Map a row selected with [`TODO_COLUMNS`] to a [`Todo`].
pub(crate) fn todo_from_row(row: &PgRow) -> Result<Todo> {
    let priority: i16 = row.get("priority");
    let status: i16 = row.get("status");
    Ok(Todo {
        id: row.get("id"),
        user_id: row.get("user_id"),
        category_id: row.get("category_id"),
        title: row.get("title"),
        description: row.get("description"),
        completed: row.get("completed"),
        position: row.get("position"),
        priority: Priority::try_from(priority).map_err(Error::Internal)?,
        status: Status::try_from(status).map_err(Error::Internal)?,
        due_date: row.get("due_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Populate category and tags for a batch of todos with two queries,
/// preserving input order.
pub(crate) async fn load_relations(
    pool: &Pool<Postgres>,
    todos: Vec<Todo>,
) -> Result<Vec<TodoWithRelations>> {
    if todos.is_empty() {
        return Ok(Vec::new());
    }

    let todo_ids: Vec<i64> = todos.iter().map(|t| t.id).collect();
    let mut category_ids: Vec<i64> = todos.iter().filter_map(|t| t.category_id).collect();
    category_ids.sort_unstable();
    category_ids.dedup();

    let mut categories: HashMap<i64, CategorySummary> = HashMap::new();
    if !category_ids.is_empty() {
        let rows = sqlx::query("SELECT id, name, color FROM categories WHERE id = ANY($1)")
            .bind(&category_ids)
            .fetch_all(pool)
            .await
            .map_err(Error::Database)?;
        for row in rows {
            let summary = CategorySummary {
                id: row.get("id"),
                name: row.get("name"),
                color: row.get("color"),
            };
            categories.insert(summary.id, summary);
        }
    }

    let rows = sqlx::query(
        r#"
        SELECT tt.todo_id, tg.id, tg.name, tg.color
        FROM todo_tags tt
        JOIN tags tg ON tg.id = tt.tag_id
        WHERE tt.todo_id = ANY($1)
        ORDER BY tg.name
        "#,
    )
    .bind(&todo_ids)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)?;

    let mut tags: HashMap<i64, Vec<TagSummary>> = HashMap::new();
    for row in rows {
        tags.entry(row.get("todo_id")).or_default().push(TagSummary {
            id: row.get("id"),
            name: row.get("name"),
            color: row.get("color"),
        });
    }

    Ok(todos
        .into_iter()
        .map(|todo| TodoWithRelations {
            category: todo.category_id.and_then(|id| categories.get(&id).cloned()),
            tags: tags.remove(&todo.id).unwrap_or_default(),
            todo,
        })
        .collect())
}

/// Replace the tag set of a todo on an open connection or transaction.
async fn replace_tags(conn: &mut PgConnection, todo_id: i64, tag_ids: &[i64]) -> Result<()> {
    sqlx::query("DELETE FROM todo_tags WHERE todo_id = $1")
        .bind(todo_id)
        .execute(&mut *conn)
        .await
        .map_err(Error::Database)?;

    if !tag_ids.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO todo_tags (todo_id, tag_id)
            SELECT $1, UNNEST($2::bigint[])
            ON CONFLICT (todo_id, tag_id) DO NOTHING
            "#,
        )
        .bind(todo_id)
        .bind(tag_ids)
        .execute(&mut *conn)
        .await
        .map_err(Error::Database)?;
    }
    Ok(())
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn find_all(&self, owner: OwnerId) -> Result<Vec<Todo>> {
        let sql = format!(
            "SELECT {} FROM todos t WHERE t.user_id = $1 ORDER BY {}",
            TODO_COLUMNS, LIST_ORDER
        );
        let rows = sqlx::query(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        rows.iter().map(todo_from_row).collect()
    }

    async fn find_one(&self, id: i64, owner: OwnerId) -> Result<Todo> {
        let sql = format!(
            "SELECT {} FROM todos t WHERE t.id = $1 AND t.user_id = $2",
            TODO_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::TodoNotFound(id))?;
        todo_from_row(&row)
    }

    async fn find_with_relations(&self, id: i64, owner: OwnerId) -> Result<TodoWithRelations> {
        let todo = self.find_one(id, owner).await?;
        load_relations(&self.pool, vec![todo])
            .await?
            .pop()
            .ok_or(Error::TodoNotFound(id))
    }

    async fn list_with_relations(&self, owner: OwnerId) -> Result<Vec<TodoWithRelations>> {
        let todos = self.find_all(owner).await?;
        load_relations(&self.pool, todos).await
    }

    #[instrument(skip(self, todo), fields(subsystem = "database", component = "todos", op = "insert", owner_id = todo.user_id))]
    async fn insert(&self, todo: NewTodo) -> Result<Todo> {
        // Position defaults to one past the owner's maximum in the same statement.
        let sql = format!(
            r#"
            INSERT INTO todos AS t (
                user_id, category_id, title, description, completed,
                position, priority, status, due_date
            ) VALUES (
                $1, $2, $3, $4, $5,
                COALESCE($6, (SELECT COALESCE(MAX(position), 0) + 1 FROM todos WHERE user_id = $1)),
                $7, $8, $9
            )
            RETURNING {}
            "#,
            TODO_COLUMNS
        );
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let row = sqlx::query(&sql)
            .bind(todo.user_id)
            .bind(todo.category_id)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.completed)
            .bind(todo.position)
            .bind(i16::from(todo.priority))
            .bind(i16::from(todo.status))
            .bind(todo.due_date)
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?;
        let inserted = todo_from_row(&row)?;

        if !todo.tag_ids.is_empty() {
            replace_tags(&mut *tx, inserted.id, &todo.tag_ids).await?;
        }
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            todo_id = inserted.id,
            position = ?inserted.position,
            tag_count = todo.tag_ids.len(),
            "Todo row inserted"
        );
        Ok(inserted)
    }

    #[instrument(skip(self, todo, tag_ids), fields(subsystem = "database", component = "todos", op = "replace", todo_id = todo.id))]
    async fn replace(&self, todo: &Todo, tag_ids: Option<&[i64]>) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let result = sqlx::query(
            r#"
            UPDATE todos SET
                category_id = $3,
                title = $4,
                description = $5,
                completed = $6,
                position = $7,
                priority = $8,
                status = $9,
                due_date = $10,
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(todo.id)
        .bind(todo.user_id)
        .bind(todo.category_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.completed)
        .bind(todo.position)
        .bind(i16::from(todo.priority))
        .bind(i16::from(todo.status))
        .bind(todo.due_date)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::TodoNotFound(todo.id));
        }
        if let Some(tag_ids) = tag_ids {
            replace_tags(&mut *tx, todo.id, tag_ids).await?;
        }
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn delete(&self, id: i64, owner: OwnerId) -> Result<()> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::TodoNotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self, updates), fields(subsystem = "database", component = "todos", op = "bulk_reposition", owner_id = owner, input_count = updates.len()))]
    async fn bulk_reposition(&self, owner: OwnerId, updates: &[PositionUpdate]) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let mut applied = 0;

        for update in updates {
            let result = sqlx::query(
                "UPDATE todos SET position = $1, updated_at = now() WHERE id = $2 AND user_id = $3",
            )
            .bind(update.position)
            .bind(update.id)
            .bind(owner)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
            applied += result.rows_affected();
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(applied)
    }

    async fn count(&self, owner: OwnerId) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM todos WHERE user_id = $1")
            .bind(owner)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.get("n"))
    }
}
