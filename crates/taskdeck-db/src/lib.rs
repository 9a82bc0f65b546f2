//! # taskdeck-db
//!
//! PostgreSQL database layer for taskdeck.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for todos, categories and tags
//! - Atomic category counter maintenance
//! - Filtered, paginated todo search
//! - API key principal resolution
//!
//! ## Example
//!
//! ```rust,ignore
//! use taskdeck_db::{Database, TodoRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/taskdeck").await?;
//!     let todos = db.todos.find_all(1).await?;
//!     println!("{} todos", todos.len());
//!     Ok(())
//! }
//! ```

pub mod categories;
pub mod ownership;
pub mod pool;
pub mod principals;
pub mod search;
pub mod tags;
pub mod todos;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use taskdeck_core::*;

pub use categories::PgCategoryRepository;
pub use ownership::PgOwnershipValidator;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use principals::PgPrincipalResolver;
pub use search::{PgTodoSearch, QueryParam, TodoFilterQueryBuilder};
pub use tags::PgTagRepository;
pub use todos::PgTodoRepository;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Map a unique violation on an owner's name to `Validation{name}`.
pub(crate) fn name_conflict(e: sqlx::Error) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::validation("name", NAME_TAKEN_MESSAGE)
        }
        _ => Error::Database(e),
    }
}

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub todos: PgTodoRepository,
    /// Category CRUD and the todo counter maintainer.
    pub categories: PgCategoryRepository,
    pub tags: PgTagRepository,
    pub ownership: PgOwnershipValidator,
    pub search: PgTodoSearch,
    /// API key lookup for bearer authentication.
    pub principals: PgPrincipalResolver,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            todos: PgTodoRepository::new(pool.clone()),
            categories: PgCategoryRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            ownership: PgOwnershipValidator::new(pool.clone()),
            search: PgTodoSearch::new(pool.clone()),
            principals: PgPrincipalResolver::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
