//! Core traits for taskdeck storage and identity collaborators.
//!
//! The engines in [`crate::service`] depend only on these traits, so the
//! PostgreSQL backend and the in-memory test store are interchangeable.
//! Every method that reads or mutates a row takes the owner id and must behave
//! as if rows of other owners do not exist.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;
use crate::search::{TodoSearchPage, TodoSearchQuery};

// =============================================================================
// TODO STORE
// =============================================================================

/// Persistence for todos.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// All todos of an owner, ordered by `COALESCE(position, 0) ASC, created_at DESC`.
    async fn find_all(&self, owner: OwnerId) -> Result<Vec<Todo>>;

    /// Fetch one todo. Fails with `TodoNotFound` for a missing or foreign id.
    async fn find_one(&self, id: i64, owner: OwnerId) -> Result<Todo>;

    /// Fetch one todo with its category and tags populated.
    async fn find_with_relations(&self, id: i64, owner: OwnerId) -> Result<TodoWithRelations>;

    /// [`find_all`](Self::find_all) with relations populated, same order.
    async fn list_with_relations(&self, owner: OwnerId) -> Result<Vec<TodoWithRelations>>;

    /// Insert a todo, assigning id and timestamps, and attach `todo.tag_ids`.
    ///
    /// When `position` is `None` the store assigns one more than the owner's
    /// current maximum in the same statement. Row and tag associations are
    /// written in one transaction: on error nothing is stored.
    async fn insert(&self, todo: NewTodo) -> Result<Todo>;

    /// Overwrite every mutable column of a previously loaded todo.
    ///
    /// With `Some(tag_ids)` the tag set is replaced in the same transaction;
    /// `None` leaves associations untouched. Last write wins. Fails with
    /// `TodoNotFound` if the row vanished.
    async fn replace(&self, todo: &Todo, tag_ids: Option<&[i64]>) -> Result<()>;

    /// Delete a todo. Fails with `TodoNotFound` if no row matched.
    async fn delete(&self, id: i64, owner: OwnerId) -> Result<()>;

    /// Apply position updates in one transaction.
    ///
    /// Ids not owned by `owner` are skipped. Returns how many rows changed.
    async fn bulk_reposition(&self, owner: OwnerId, updates: &[PositionUpdate]) -> Result<u64>;

    /// Number of todos owned by `owner`.
    async fn count(&self, owner: OwnerId) -> Result<i64>;
}

// =============================================================================
// OWNERSHIP / COUNTERS
// =============================================================================

/// Checks that referenced categories and tags belong to the caller.
#[async_trait]
pub trait OwnershipValidator: Send + Sync {
    /// True iff the category exists and belongs to `owner`.
    async fn category_owned_by(&self, category_id: i64, owner: OwnerId) -> Result<bool>;

    /// True iff every distinct id names a tag belonging to `owner`.
    /// An empty slice is trivially owned.
    async fn tags_owned_by(&self, tag_ids: &[i64], owner: OwnerId) -> Result<bool>;
}

/// Maintains the denormalized `todos_count` on categories.
///
/// Adjustments are single-statement atomic updates; callers treat them as
/// best-effort.
#[async_trait]
pub trait CategoryCounter: Send + Sync {
    async fn increment(&self, category_id: i64) -> Result<()>;

    /// Decrement, never going below zero.
    async fn decrement(&self, category_id: i64) -> Result<()>;

    /// Recompute the count from todo rows and return the new value.
    async fn recalculate(&self, category_id: i64) -> Result<i32>;
}

// =============================================================================
// CATEGORY / TAG STORES
// =============================================================================

/// Owner-scoped category persistence.
///
/// Inputs arrive validated and normalized. Duplicate names within an owner
/// fail with `Validation{name}`.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories of an owner, ordered by name.
    async fn list(&self, owner: OwnerId) -> Result<Vec<Category>>;

    /// Fails with `CategoryNotFound` for a missing or foreign id.
    async fn get(&self, id: i64, owner: OwnerId) -> Result<Category>;

    async fn create(&self, owner: OwnerId, req: &CreateCategoryRequest) -> Result<Category>;

    async fn update(
        &self,
        id: i64,
        owner: OwnerId,
        req: &UpdateCategoryRequest,
    ) -> Result<Category>;

    /// Delete a category; todos referencing it become uncategorized.
    async fn delete(&self, id: i64, owner: OwnerId) -> Result<()>;
}

/// Owner-scoped tag persistence.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// All tags of an owner, ordered by name.
    async fn list(&self, owner: OwnerId) -> Result<Vec<Tag>>;

    /// Fails with `TagNotFound` for a missing or foreign id.
    async fn get(&self, id: i64, owner: OwnerId) -> Result<Tag>;

    async fn create(&self, owner: OwnerId, req: &CreateTagRequest) -> Result<Tag>;

    async fn update(&self, id: i64, owner: OwnerId, req: &UpdateTagRequest) -> Result<Tag>;

    /// Delete a tag and its todo associations.
    async fn delete(&self, id: i64, owner: OwnerId) -> Result<()>;
}

// =============================================================================
// SEARCH / IDENTITY
// =============================================================================

/// Executes a validated search.
#[async_trait]
pub trait TodoSearchProvider: Send + Sync {
    /// One page of matches, owner-scoped, plus the total across all pages.
    async fn search(&self, owner: OwnerId, query: &TodoSearchQuery) -> Result<TodoSearchPage>;
}

/// Maps a bearer credential to the principal it authenticates.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// `Ok(None)` when the token is unknown or revoked.
    async fn resolve(&self, token: &str) -> Result<Option<OwnerId>>;
}
