//! Filtered, paginated todo search.

use std::time::Instant;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, instrument};

use taskdeck_core::{
    CategoryFilter, Error, OwnerId, Result, TagMode, TodoSearchPage, TodoSearchProvider,
    TodoSearchQuery,
};

use crate::escape_like;
use crate::todos::{load_relations, todo_from_row, TODO_COLUMNS};

/// A bind parameter produced by [`TodoFilterQueryBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    BigInt(i64),
    /// Array of ids (for `ANY` matching).
    BigIntArray(Vec<i64>),
    SmallInt(i16),
    /// Array of small integers (status sets).
    SmallIntArray(Vec<i16>),
    Date(NaiveDate),
    String(String),
}

/// Generates the WHERE clause for a [`TodoSearchQuery`].
///
/// Every predicate is ANDed; absent filters contribute nothing. The owner
/// predicate is always first and always present.
///
/// ```rust,ignore
/// let builder = TodoFilterQueryBuilder::new(&query, 0);
/// let (sql, params) = builder.build(owner);
/// // sql: "t.user_id = $1 AND t.priority = $2"
/// ```
pub struct TodoFilterQueryBuilder<'a> {
    query: &'a TodoSearchQuery,
    param_offset: usize,
}

impl<'a> TodoFilterQueryBuilder<'a> {
    /// `param_offset` is the number of parameters already in the statement.
    pub fn new(query: &'a TodoSearchQuery, param_offset: usize) -> Self {
        Self {
            query,
            param_offset,
        }
    }

    pub fn build(&self, owner: OwnerId) -> (String, Vec<QueryParam>) {
        let q = self.query;
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        let mut param_idx = self.param_offset;

        param_idx += 1;
        clauses.push(format!("t.user_id = ${}", param_idx));
        params.push(QueryParam::BigInt(owner));

        if let Some(text) = &q.text {
            param_idx += 1;
            clauses.push(format!(
                "(t.title ILIKE ${0} ESCAPE '\\' OR t.description ILIKE ${0} ESCAPE '\\')",
                param_idx
            ));
            params.push(QueryParam::String(format!("%{}%", escape_like(text))));
        }

        if let Some(statuses) = &q.statuses {
            param_idx += 1;
            clauses.push(format!("t.status = ANY(${}::smallint[])", param_idx));
            params.push(QueryParam::SmallIntArray(
                statuses.iter().map(|s| i16::from(*s)).collect(),
            ));
        }

        if let Some(priority) = q.priority {
            param_idx += 1;
            clauses.push(format!("t.priority = ${}", param_idx));
            params.push(QueryParam::SmallInt(i16::from(priority)));
        }

        match q.category {
            Some(CategoryFilter::Id(id)) => {
                param_idx += 1;
                clauses.push(format!("t.category_id = ${}", param_idx));
                params.push(QueryParam::BigInt(id));
            }
            Some(CategoryFilter::Uncategorized) => clauses.push("t.category_id IS NULL".to_string()),
            None => {}
        }

        if let Some(tags) = &q.tags {
            param_idx += 1;
            match tags.mode {
                TagMode::Any => clauses.push(format!(
                    "EXISTS (SELECT 1 FROM todo_tags tt WHERE tt.todo_id = t.id AND tt.tag_id = ANY(${}::bigint[]))",
                    param_idx
                )),
                TagMode::All => {
                    clauses.push(format!(
                        "(SELECT COUNT(DISTINCT tt.tag_id) FROM todo_tags tt WHERE tt.todo_id = t.id AND tt.tag_id = ANY(${}::bigint[])) = {}",
                        param_idx,
                        tags.ids.len()
                    ));
                }
            }
            params.push(QueryParam::BigIntArray(tags.ids.clone()));
        }

        if let Some(from) = q.due_date_from {
            param_idx += 1;
            clauses.push(format!("t.due_date >= ${}", param_idx));
            params.push(QueryParam::Date(from));
        }

        if let Some(to) = q.due_date_to {
            param_idx += 1;
            clauses.push(format!("t.due_date <= ${}", param_idx));
            params.push(QueryParam::Date(to));
        }

        (clauses.join(" AND "), params)
    }

    /// `ORDER BY` body; ties always break on id ascending.
    pub fn order_by(&self) -> String {
        format!(
            "t.{} {}, t.id ASC",
            self.query.sort_by.column(),
            self.query.sort_order.as_sql()
        )
    }
}

macro_rules! bind_params {
    ($q:expr, $params:expr) => {{
        let mut q = $q;
        for param in $params {
            q = match param {
                QueryParam::BigInt(v) => q.bind(*v),
                QueryParam::BigIntArray(v) => q.bind(v.clone()),
                QueryParam::SmallInt(v) => q.bind(*v),
                QueryParam::SmallIntArray(v) => q.bind(v.clone()),
                QueryParam::Date(v) => q.bind(*v),
                QueryParam::String(v) => q.bind(v.clone()),
            };
        }
        q
    }};
}

/// PostgreSQL search provider.
pub struct PgTodoSearch {
    pool: Pool<Postgres>,
}

impl PgTodoSearch {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoSearchProvider for PgTodoSearch {
    #[instrument(skip(self, query), fields(subsystem = "database", component = "todo_search", op = "search", owner_id = owner))]
    async fn search(&self, owner: OwnerId, query: &TodoSearchQuery) -> Result<TodoSearchPage> {
        let start = Instant::now();
        let builder = TodoFilterQueryBuilder::new(query, 0);
        let (where_clause, params) = builder.build(owner);

        let count_sql = format!("SELECT COUNT(*) AS total FROM todos t WHERE {}", where_clause);
        let count_row = bind_params!(sqlx::query(&count_sql), &params)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        let total: i64 = count_row.get("total");

        let page_sql = format!(
            "SELECT {} FROM todos t WHERE {} ORDER BY {} LIMIT ${} OFFSET ${}",
            TODO_COLUMNS,
            where_clause,
            builder.order_by(),
            params.len() + 1,
            params.len() + 2
        );
        let rows = bind_params!(sqlx::query(&page_sql), &params)
            .bind(query.per_page)
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let todos = rows.iter().map(todo_from_row).collect::<Result<Vec<_>>>()?;
        let todos = load_relations(&self.pool, todos).await?;

        debug!(
            result_count = todos.len(),
            total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Todo search executed"
        );
        Ok(TodoSearchPage { todos, total })
    }
}
