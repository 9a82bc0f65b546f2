//! Todo mutation engine.
//!
//! Each operation is a single transition: validate everything that can fail,
//! persist the row and its tags in one store write, then run best-effort
//! category counter maintenance. Validation failures abort before anything is
//! written; counter failures are logged and never reach the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::models::*;
use crate::patch::Patch;
use crate::temporal::{
    is_before_today, parse_date, Clock, SystemClock, INVALID_DATE_MESSAGE, PAST_DUE_DATE_MESSAGE,
};
use crate::traits::{CategoryCounter, OwnershipValidator, TodoRepository};

/// Reported under `category_id` when the category is missing or foreign.
pub const CATEGORY_NOT_OWNED_MESSAGE: &str = "Category not found or not owned by user";

/// Reported under `tag_ids` when any tag is missing or foreign.
pub const TAGS_NOT_OWNED_MESSAGE: &str = "One or more tags not found or not owned by user";

/// Creates, updates, deletes and reorders todos for one owner at a time.
#[derive(Clone)]
pub struct TodoService {
    todos: Arc<dyn TodoRepository>,
    ownership: Arc<dyn OwnershipValidator>,
    counter: Arc<dyn CategoryCounter>,
    clock: Arc<dyn Clock>,
}

impl TodoService {
    pub fn new(
        todos: Arc<dyn TodoRepository>,
        ownership: Arc<dyn OwnershipValidator>,
        counter: Arc<dyn CategoryCounter>,
    ) -> Self {
        Self {
            todos,
            ownership,
            counter,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for the past-due-date check.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// All todos of an owner with relations, in display order.
    pub async fn list(&self, owner: OwnerId) -> Result<Vec<TodoWithRelations>> {
        self.todos.list_with_relations(owner).await
    }

    /// One todo with relations.
    pub async fn get(&self, id: i64, owner: OwnerId) -> Result<TodoWithRelations> {
        self.todos.find_with_relations(id, owner).await
    }

    #[instrument(skip(self, req), fields(
        subsystem = "core",
        component = "todo_service",
        op = "create",
        owner_id = owner,
    ))]
    pub async fn create(
        &self,
        owner: OwnerId,
        req: CreateTodoRequest,
    ) -> Result<TodoWithRelations> {
        let start = Instant::now();
        req.validate().into_result()?;

        if let Some(category_id) = req.category_id {
            self.ensure_category_owned(category_id, owner).await?;
        }

        let due_date = match req.due_date.as_deref() {
            Some(raw) => {
                let parsed =
                    parse_date(raw).map_err(|_| Error::validation("due_date", INVALID_DATE_MESSAGE))?;
                if let Some(date) = parsed {
                    if is_before_today(date, self.clock.today()) {
                        return Err(Error::validation("due_date", PAST_DUE_DATE_MESSAGE));
                    }
                }
                parsed
            }
            None => None,
        };

        let tag_ids = req.tag_ids.unwrap_or_default();
        self.ensure_tags_owned(&tag_ids, owner).await?;

        let priority = req.priority.unwrap_or_default();
        let status = req.status.unwrap_or_default();
        debug!(%priority, %status, "Resolved todo defaults");

        let todo = self
            .todos
            .insert(NewTodo {
                user_id: owner,
                category_id: req.category_id,
                title: req.title,
                description: req.description,
                completed: status.is_completed(),
                position: req.position,
                priority,
                status,
                due_date,
                tag_ids,
            })
            .await?;

        if let Some(category_id) = todo.category_id {
            self.adjust_counter("increment", category_id, self.counter.increment(category_id))
                .await;
        }

        info!(
            todo_id = todo.id,
            position = ?todo.position,
            duration_ms = start.elapsed().as_millis() as u64,
            "Todo created"
        );
        self.todos.find_with_relations(todo.id, owner).await
    }

    #[instrument(skip(self, req), fields(
        subsystem = "core",
        component = "todo_service",
        op = "update",
        owner_id = owner,
        todo_id = id,
    ))]
    pub async fn update(
        &self,
        id: i64,
        owner: OwnerId,
        req: UpdateTodoRequest,
    ) -> Result<TodoWithRelations> {
        let start = Instant::now();
        req.validate().into_result()?;

        let mut todo = self.todos.find_one(id, owner).await?;
        let old_category = todo.category_id;

        if let Patch::Value(title) = req.title {
            todo.title = title;
        }
        if let Some(description) = req.description.into_update() {
            todo.description = description;
        }

        match req.category_id {
            Patch::Null | Patch::Value(0) => todo.category_id = None,
            Patch::Value(category_id) => {
                self.ensure_category_owned(category_id, owner).await?;
                todo.category_id = Some(category_id);
            }
            Patch::Absent => {}
        }

        // completed first, then status; status wins when both are supplied
        if let Patch::Value(completed) = req.completed {
            todo.completed = completed;
            if completed {
                todo.status = Status::Completed;
            } else if todo.status == Status::Completed {
                todo.status = Status::Pending;
            }
        }
        if let Patch::Value(status) = req.status {
            todo.status = status;
            todo.completed = status.is_completed();
        }

        if let Patch::Value(priority) = req.priority {
            todo.priority = priority;
        }

        match req.due_date {
            Patch::Null => todo.due_date = None,
            Patch::Value(raw) => {
                todo.due_date = parse_date(&raw)
                    .map_err(|_| Error::validation("due_date", INVALID_DATE_MESSAGE))?;
            }
            Patch::Absent => {}
        }

        if let Some(position) = req.position.into_update() {
            todo.position = position;
        }

        let tag_ids = req.tag_ids.into_update().map(Option::unwrap_or_default);
        if let Some(ids) = &tag_ids {
            self.ensure_tags_owned(ids, owner).await?;
        }

        self.todos.replace(&todo, tag_ids.as_deref()).await?;

        if old_category != todo.category_id {
            debug!(old = ?old_category, new = ?todo.category_id, "Category changed");
            if let Some(old) = old_category {
                self.adjust_counter("decrement", old, self.counter.decrement(old))
                    .await;
            }
            if let Some(new) = todo.category_id {
                self.adjust_counter("increment", new, self.counter.increment(new))
                    .await;
            }
        }

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            "Todo updated"
        );
        self.todos.find_with_relations(todo.id, owner).await
    }

    #[instrument(skip(self), fields(
        subsystem = "core",
        component = "todo_service",
        op = "delete",
        owner_id = owner,
        todo_id = id,
    ))]
    pub async fn delete(&self, id: i64, owner: OwnerId) -> Result<()> {
        let todo = self.todos.find_one(id, owner).await?;
        self.todos.delete(id, owner).await?;

        if let Some(category_id) = todo.category_id {
            self.adjust_counter("decrement", category_id, self.counter.decrement(category_id))
                .await;
        }

        info!("Todo deleted");
        Ok(())
    }

    /// Apply a bulk reorder. Unknown or foreign ids are skipped.
    #[instrument(skip(self, updates), fields(
        subsystem = "core",
        component = "todo_service",
        op = "update_order",
        owner_id = owner,
        input_count = updates.len(),
    ))]
    pub async fn update_order(&self, owner: OwnerId, updates: &[PositionUpdate]) -> Result<u64> {
        validate_position_updates(updates).into_result()?;
        let applied = self.todos.bulk_reposition(owner, updates).await?;
        debug!(applied, skipped = updates.len() as u64 - applied, "Reorder applied");
        Ok(applied)
    }

    /// Rebuild a category's counter from actual todo rows.
    ///
    /// Only runs on demand; nothing in the mutation path calls it.
    #[instrument(skip(self), fields(
        subsystem = "core",
        component = "category_counter",
        op = "recalculate",
        owner_id = owner,
        category_id = category_id,
    ))]
    pub async fn recalculate_category_count(
        &self,
        owner: OwnerId,
        category_id: i64,
    ) -> Result<i32> {
        if !self.ownership.category_owned_by(category_id, owner).await? {
            return Err(Error::CategoryNotFound(category_id));
        }
        let count = self.counter.recalculate(category_id).await?;
        info!(todos_count = count, "Category counter recalculated");
        Ok(count)
    }

    async fn ensure_category_owned(&self, category_id: i64, owner: OwnerId) -> Result<()> {
        if self.ownership.category_owned_by(category_id, owner).await? {
            Ok(())
        } else {
            Err(Error::validation("category_id", CATEGORY_NOT_OWNED_MESSAGE))
        }
    }

    async fn ensure_tags_owned(&self, tag_ids: &[i64], owner: OwnerId) -> Result<()> {
        if tag_ids.is_empty() || self.ownership.tags_owned_by(tag_ids, owner).await? {
            Ok(())
        } else {
            Err(Error::validation("tag_ids", TAGS_NOT_OWNED_MESSAGE))
        }
    }

    /// Fire-and-log: a failed counter adjustment is reported and swallowed.
    async fn adjust_counter(
        &self,
        op: &'static str,
        category_id: i64,
        adjustment: impl Future<Output = Result<()>>,
    ) {
        if let Err(e) = adjustment.await {
            warn!(
                component = "category_counter",
                op,
                category_id,
                error = %e,
                "Category counter adjustment failed"
            );
        }
    }
}
