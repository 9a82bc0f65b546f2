//! In-memory store and test doubles.
//!
//! [`InMemoryStore`] implements every storage trait with the same ordering,
//! scoping and defaulting rules as the PostgreSQL backend, so engines and
//! HTTP handlers can be tested without a database.
//!
//! ```rust,ignore
//! let store = Arc::new(InMemoryStore::new());
//! let service = TodoService::new(store.clone(), store.clone(), store.clone());
//! let todo = service.create(1, CreateTodoRequest::titled("Buy milk")).await?;
//! assert_eq!(todo.todo.position, Some(1));
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::models::*;
use crate::patch::Patch;
use crate::search::{CategoryFilter, SortField, SortOrder, TagMode, TodoSearchPage, TodoSearchQuery};
use crate::traits::*;

#[derive(Default)]
struct State {
    next_id: i64,
    tick: i64,
    todos: BTreeMap<i64, Todo>,
    categories: BTreeMap<i64, Category>,
    tags: BTreeMap<i64, Tag>,
    todo_tags: BTreeSet<(i64, i64)>,
    api_keys: HashMap<String, OwnerId>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Strictly increasing timestamps so creation order is observable.
    fn now(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        Utc.timestamp_opt(1_700_000_000, 0)
            .single()
            .unwrap_or_default()
            + Duration::seconds(self.tick)
    }

    fn hydrate(&self, todo: &Todo) -> TodoWithRelations {
        let category = todo
            .category_id
            .and_then(|id| self.categories.get(&id))
            .map(|c| CategorySummary {
                id: c.id,
                name: c.name.clone(),
                color: c.color.clone(),
            });
        let mut tags: Vec<TagSummary> = self
            .todo_tags
            .iter()
            .filter(|(todo_id, _)| *todo_id == todo.id)
            .filter_map(|(_, tag_id)| self.tags.get(tag_id))
            .map(|t| TagSummary {
                id: t.id,
                name: t.name.clone(),
                color: t.color.clone(),
            })
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        TodoWithRelations {
            todo: todo.clone(),
            category,
            tags,
        }
    }

    fn owned_todos(&self, owner: OwnerId) -> Vec<&Todo> {
        let mut todos: Vec<&Todo> = self.todos.values().filter(|t| t.user_id == owner).collect();
        todos.sort_by(|a, b| {
            a.position
                .unwrap_or(0)
                .cmp(&b.position.unwrap_or(0))
                .then(b.created_at.cmp(&a.created_at))
        });
        todos
    }

    fn tag_ids_of(&self, todo_id: i64) -> BTreeSet<i64> {
        self.todo_tags
            .iter()
            .filter(|(t, _)| *t == todo_id)
            .map(|(_, tag)| *tag)
            .collect()
    }

    fn replace_tags(&mut self, todo_id: i64, tag_ids: &[i64]) {
        self.todo_tags.retain(|(t, _)| *t != todo_id);
        for tag_id in tag_ids {
            self.todo_tags.insert((todo_id, *tag_id));
        }
    }

    fn category_name_taken(&self, owner: OwnerId, name: &str, except: Option<i64>) -> bool {
        self.categories
            .values()
            .any(|c| c.user_id == owner && c.name == name && Some(c.id) != except)
    }

    fn tag_name_taken(&self, owner: OwnerId, name: &str, except: Option<i64>) -> bool {
        self.tags
            .values()
            .any(|t| t.user_id == owner && t.name == name && Some(t.id) != except)
    }
}

/// Thread-safe in-memory implementation of every storage trait.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed a category directly, bypassing validation. Returns its id.
    pub fn add_category(&self, owner: OwnerId, name: &str) -> i64 {
        let mut state = self.state();
        let id = state.next_id();
        let now = state.now();
        state.categories.insert(
            id,
            Category {
                id,
                user_id: owner,
                name: name.to_string(),
                color: DEFAULT_COLOR.to_string(),
                todos_count: 0,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Seed a tag directly, bypassing validation. Returns its id.
    pub fn add_tag(&self, owner: OwnerId, name: &str) -> i64 {
        let mut state = self.state();
        let id = state.next_id();
        let now = state.now();
        state.tags.insert(
            id,
            Tag {
                id,
                user_id: owner,
                name: name.to_string(),
                color: None,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Register a bearer token for an owner.
    pub fn add_api_key(&self, token: &str, owner: OwnerId) {
        self.state().api_keys.insert(token.to_string(), owner);
    }

    pub fn todo_count(&self) -> usize {
        self.state().todos.len()
    }

    /// Stored `todos_count` of a category (0 if missing).
    pub fn category_counter(&self, category_id: i64) -> i32 {
        self.state()
            .categories
            .get(&category_id)
            .map(|c| c.todos_count)
            .unwrap_or(0)
    }

    /// Number of todos actually referencing a category.
    pub fn todos_in_category(&self, category_id: i64) -> usize {
        self.state()
            .todos
            .values()
            .filter(|t| t.category_id == Some(category_id))
            .count()
    }

    /// Force a counter value to simulate drift.
    pub fn set_category_counter(&self, category_id: i64, value: i32) {
        if let Some(c) = self.state().categories.get_mut(&category_id) {
            c.todos_count = value;
        }
    }
}

#[async_trait]
impl TodoRepository for InMemoryStore {
    async fn find_all(&self, owner: OwnerId) -> Result<Vec<Todo>> {
        let state = self.state();
        Ok(state.owned_todos(owner).into_iter().cloned().collect())
    }

    async fn find_one(&self, id: i64, owner: OwnerId) -> Result<Todo> {
        self.state()
            .todos
            .get(&id)
            .filter(|t| t.user_id == owner)
            .cloned()
            .ok_or(Error::TodoNotFound(id))
    }

    async fn find_with_relations(&self, id: i64, owner: OwnerId) -> Result<TodoWithRelations> {
        let state = self.state();
        state
            .todos
            .get(&id)
            .filter(|t| t.user_id == owner)
            .map(|t| state.hydrate(t))
            .ok_or(Error::TodoNotFound(id))
    }

    async fn list_with_relations(&self, owner: OwnerId) -> Result<Vec<TodoWithRelations>> {
        let state = self.state();
        Ok(state
            .owned_todos(owner)
            .into_iter()
            .map(|t| state.hydrate(t))
            .collect())
    }

    async fn insert(&self, todo: NewTodo) -> Result<Todo> {
        let mut state = self.state();
        let position = match todo.position {
            Some(p) => p,
            None => {
                state
                    .todos
                    .values()
                    .filter(|t| t.user_id == todo.user_id)
                    .filter_map(|t| t.position)
                    .max()
                    .unwrap_or(0)
                    + 1
            }
        };
        let id = state.next_id();
        let now = state.now();
        let row = Todo {
            id,
            user_id: todo.user_id,
            category_id: todo.category_id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            position: Some(position),
            priority: todo.priority,
            status: todo.status,
            due_date: todo.due_date,
            created_at: now,
            updated_at: now,
        };
        state.todos.insert(id, row.clone());
        state.replace_tags(id, &todo.tag_ids);
        Ok(row)
    }

    async fn replace(&self, todo: &Todo, tag_ids: Option<&[i64]>) -> Result<()> {
        let mut state = self.state();
        let now = state.now();
        let row = state
            .todos
            .get_mut(&todo.id)
            .filter(|t| t.user_id == todo.user_id)
            .ok_or(Error::TodoNotFound(todo.id))?;
        *row = Todo {
            created_at: row.created_at,
            updated_at: now,
            ..todo.clone()
        };
        if let Some(tag_ids) = tag_ids {
            state.replace_tags(todo.id, tag_ids);
        }
        Ok(())
    }

    async fn delete(&self, id: i64, owner: OwnerId) -> Result<()> {
        let mut state = self.state();
        match state.todos.get(&id) {
            Some(t) if t.user_id == owner => {
                state.todos.remove(&id);
                state.todo_tags.retain(|(todo_id, _)| *todo_id != id);
                Ok(())
            }
            _ => Err(Error::TodoNotFound(id)),
        }
    }

    async fn bulk_reposition(&self, owner: OwnerId, updates: &[PositionUpdate]) -> Result<u64> {
        let mut state = self.state();
        let mut applied = 0;
        for update in updates {
            if let Some(t) = state
                .todos
                .get_mut(&update.id)
                .filter(|t| t.user_id == owner)
            {
                t.position = Some(update.position);
                applied += 1;
            }
        }
        Ok(applied)
    }

    async fn count(&self, owner: OwnerId) -> Result<i64> {
        Ok(self
            .state()
            .todos
            .values()
            .filter(|t| t.user_id == owner)
            .count() as i64)
    }
}

#[async_trait]
impl OwnershipValidator for InMemoryStore {
    async fn category_owned_by(&self, category_id: i64, owner: OwnerId) -> Result<bool> {
        Ok(self
            .state()
            .categories
            .get(&category_id)
            .is_some_and(|c| c.user_id == owner))
    }

    async fn tags_owned_by(&self, tag_ids: &[i64], owner: OwnerId) -> Result<bool> {
        let state = self.state();
        Ok(tag_ids
            .iter()
            .all(|id| state.tags.get(id).is_some_and(|t| t.user_id == owner)))
    }
}

#[async_trait]
impl CategoryCounter for InMemoryStore {
    async fn increment(&self, category_id: i64) -> Result<()> {
        if let Some(c) = self.state().categories.get_mut(&category_id) {
            c.todos_count += 1;
        }
        Ok(())
    }

    async fn decrement(&self, category_id: i64) -> Result<()> {
        if let Some(c) = self.state().categories.get_mut(&category_id) {
            c.todos_count = (c.todos_count - 1).max(0);
        }
        Ok(())
    }

    async fn recalculate(&self, category_id: i64) -> Result<i32> {
        let mut state = self.state();
        let actual = state
            .todos
            .values()
            .filter(|t| t.category_id == Some(category_id))
            .count() as i32;
        let c = state
            .categories
            .get_mut(&category_id)
            .ok_or(Error::CategoryNotFound(category_id))?;
        c.todos_count = actual;
        Ok(actual)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn list(&self, owner: OwnerId) -> Result<Vec<Category>> {
        let mut categories: Vec<Category> = self
            .state()
            .categories
            .values()
            .filter(|c| c.user_id == owner)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get(&self, id: i64, owner: OwnerId) -> Result<Category> {
        self.state()
            .categories
            .get(&id)
            .filter(|c| c.user_id == owner)
            .cloned()
            .ok_or(Error::CategoryNotFound(id))
    }

    async fn create(&self, owner: OwnerId, req: &CreateCategoryRequest) -> Result<Category> {
        let mut state = self.state();
        if state.category_name_taken(owner, &req.name, None) {
            return Err(Error::validation("name", NAME_TAKEN_MESSAGE));
        }
        let id = state.next_id();
        let now = state.now();
        let category = Category {
            id,
            user_id: owner,
            name: req.name.clone(),
            color: req.color.clone(),
            todos_count: 0,
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update(
        &self,
        id: i64,
        owner: OwnerId,
        req: &UpdateCategoryRequest,
    ) -> Result<Category> {
        let mut state = self.state();
        if !state.categories.get(&id).is_some_and(|c| c.user_id == owner) {
            return Err(Error::CategoryNotFound(id));
        }
        if let Some(name) = &req.name {
            if state.category_name_taken(owner, name, Some(id)) {
                return Err(Error::validation("name", NAME_TAKEN_MESSAGE));
            }
        }
        let now = state.now();
        let category = state
            .categories
            .get_mut(&id)
            .ok_or(Error::CategoryNotFound(id))?;
        if let Some(name) = &req.name {
            category.name = name.clone();
        }
        if let Some(color) = &req.color {
            category.color = color.clone();
        }
        category.updated_at = now;
        Ok(category.clone())
    }

    async fn delete(&self, id: i64, owner: OwnerId) -> Result<()> {
        let mut state = self.state();
        if !state.categories.get(&id).is_some_and(|c| c.user_id == owner) {
            return Err(Error::CategoryNotFound(id));
        }
        state.categories.remove(&id);
        for todo in state.todos.values_mut() {
            if todo.category_id == Some(id) {
                todo.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn list(&self, owner: OwnerId) -> Result<Vec<Tag>> {
        let mut tags: Vec<Tag> = self
            .state()
            .tags
            .values()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn get(&self, id: i64, owner: OwnerId) -> Result<Tag> {
        self.state()
            .tags
            .get(&id)
            .filter(|t| t.user_id == owner)
            .cloned()
            .ok_or(Error::TagNotFound(id))
    }

    async fn create(&self, owner: OwnerId, req: &CreateTagRequest) -> Result<Tag> {
        let mut state = self.state();
        if state.tag_name_taken(owner, &req.name, None) {
            return Err(Error::validation("name", NAME_TAKEN_MESSAGE));
        }
        let id = state.next_id();
        let now = state.now();
        let tag = Tag {
            id,
            user_id: owner,
            name: req.name.clone(),
            color: req.color.clone(),
            created_at: now,
            updated_at: now,
        };
        state.tags.insert(id, tag.clone());
        Ok(tag)
    }

    async fn update(&self, id: i64, owner: OwnerId, req: &UpdateTagRequest) -> Result<Tag> {
        let mut state = self.state();
        if !state.tags.get(&id).is_some_and(|t| t.user_id == owner) {
            return Err(Error::TagNotFound(id));
        }
        if let Some(name) = &req.name {
            if state.tag_name_taken(owner, name, Some(id)) {
                return Err(Error::validation("name", NAME_TAKEN_MESSAGE));
            }
        }
        let now = state.now();
        let tag = state.tags.get_mut(&id).ok_or(Error::TagNotFound(id))?;
        if let Some(name) = &req.name {
            tag.name = name.clone();
        }
        match &req.color {
            Patch::Value(color) => tag.color = Some(color.clone()),
            Patch::Null => tag.color = None,
            Patch::Absent => {}
        }
        tag.updated_at = now;
        Ok(tag.clone())
    }

    async fn delete(&self, id: i64, owner: OwnerId) -> Result<()> {
        let mut state = self.state();
        if !state.tags.get(&id).is_some_and(|t| t.user_id == owner) {
            return Err(Error::TagNotFound(id));
        }
        state.tags.remove(&id);
        state.todo_tags.retain(|(_, tag_id)| *tag_id != id);
        Ok(())
    }
}

#[async_trait]
impl TodoSearchProvider for InMemoryStore {
    async fn search(&self, owner: OwnerId, query: &TodoSearchQuery) -> Result<TodoSearchPage> {
        let state = self.state();
        let needle = query.text.as_ref().map(|t| t.to_lowercase());

        let mut matches: Vec<&Todo> = state
            .todos
            .values()
            .filter(|t| t.user_id == owner)
            .filter(|t| match &needle {
                Some(n) => {
                    t.title.to_lowercase().contains(n)
                        || t
                            .description
                            .as_ref()
                            .is_some_and(|d| d.to_lowercase().contains(n))
                }
                None => true,
            })
            .filter(|t| {
                query
                    .statuses
                    .as_ref()
                    .map_or(true, |s| s.contains(&t.status))
            })
            .filter(|t| query.priority.map_or(true, |p| t.priority == p))
            .filter(|t| match query.category {
                Some(CategoryFilter::Id(id)) => t.category_id == Some(id),
                Some(CategoryFilter::Uncategorized) => t.category_id.is_none(),
                None => true,
            })
            .filter(|t| match &query.tags {
                Some(filter) => {
                    let attached = state.tag_ids_of(t.id);
                    match filter.mode {
                        TagMode::Any => filter.ids.iter().any(|id| attached.contains(id)),
                        TagMode::All => filter.ids.iter().all(|id| attached.contains(id)),
                    }
                }
                None => true,
            })
            .filter(|t| {
                query
                    .due_date_from
                    .map_or(true, |from| t.due_date.is_some_and(|d| d >= from))
            })
            .filter(|t| {
                query
                    .due_date_to
                    .map_or(true, |to| t.due_date.is_some_and(|d| d <= to))
            })
            .collect();

        matches.sort_by(|a, b| {
            let ord = compare_field(query.sort_by, a, b);
            let ord = match query.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            ord.then(a.id.cmp(&b.id))
        });

        let total = matches.len() as i64;
        let todos = matches
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.per_page as usize)
            .map(|t| state.hydrate(t))
            .collect();

        Ok(TodoSearchPage { todos, total })
    }
}

#[async_trait]
impl PrincipalResolver for InMemoryStore {
    async fn resolve(&self, token: &str) -> Result<Option<OwnerId>> {
        Ok(self.state().api_keys.get(token).copied())
    }
}

/// Ascending comparison on one column; NULLs sort after values, as in PostgreSQL.
fn compare_field(field: SortField, a: &Todo, b: &Todo) -> Ordering {
    fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
        match (a, b) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::DueDate => nulls_last(a.due_date, b.due_date),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Priority => a.priority.cmp(&b.priority),
        SortField::Status => a.status.cmp(&b.status),
        SortField::Position => nulls_last(a.position, b.position),
    }
}

/// A counter whose every adjustment fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCounter;

#[async_trait]
impl CategoryCounter for FailingCounter {
    async fn increment(&self, _category_id: i64) -> Result<()> {
        Err(Error::Internal("category counter unavailable".to_string()))
    }

    async fn decrement(&self, _category_id: i64) -> Result<()> {
        Err(Error::Internal("category counter unavailable".to_string()))
    }

    async fn recalculate(&self, _category_id: i64) -> Result<i32> {
        Err(Error::Internal("category counter unavailable".to_string()))
    }
}

/// A todo store whose writes that carry tags fail without storing anything,
/// as a rolled-back transaction would. Everything else is delegated.
pub struct FailingTagWrites {
    inner: Arc<InMemoryStore>,
}

impl FailingTagWrites {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self { inner }
    }

    fn unavailable() -> Error {
        Error::Internal("tag association write failed".to_string())
    }
}

#[async_trait]
impl TodoRepository for FailingTagWrites {
    async fn find_all(&self, owner: OwnerId) -> Result<Vec<Todo>> {
        self.inner.find_all(owner).await
    }

    async fn find_one(&self, id: i64, owner: OwnerId) -> Result<Todo> {
        self.inner.find_one(id, owner).await
    }

    async fn find_with_relations(&self, id: i64, owner: OwnerId) -> Result<TodoWithRelations> {
        self.inner.find_with_relations(id, owner).await
    }

    async fn list_with_relations(&self, owner: OwnerId) -> Result<Vec<TodoWithRelations>> {
        self.inner.list_with_relations(owner).await
    }

    async fn insert(&self, todo: NewTodo) -> Result<Todo> {
        if !todo.tag_ids.is_empty() {
            return Err(Self::unavailable());
        }
        self.inner.insert(todo).await
    }

    async fn replace(&self, todo: &Todo, tag_ids: Option<&[i64]>) -> Result<()> {
        if tag_ids.is_some() {
            return Err(Self::unavailable());
        }
        self.inner.replace(todo, None).await
    }

    async fn delete(&self, id: i64, owner: OwnerId) -> Result<()> {
        TodoRepository::delete(self.inner.as_ref(), id, owner).await
    }

    async fn bulk_reposition(&self, owner: OwnerId, updates: &[PositionUpdate]) -> Result<u64> {
        self.inner.bulk_reposition(owner, updates).await
    }

    async fn count(&self, owner: OwnerId) -> Result<i64> {
        self.inner.count(owner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_todo(owner: OwnerId, title: &str) -> NewTodo {
        NewTodo {
            user_id: owner,
            category_id: None,
            title: title.to_string(),
            description: None,
            completed: false,
            position: None,
            priority: Priority::Medium,
            status: Status::Pending,
            due_date: None,
            tag_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_explicit_position_is_kept_and_next_follows_max() {
        let store = InMemoryStore::new();
        let a = store
            .insert(NewTodo {
                position: Some(7),
                ..new_todo(1, "a")
            })
            .await
            .unwrap();
        assert_eq!(a.position, Some(7));
        let b = store.insert(new_todo(1, "b")).await.unwrap();
        assert_eq!(b.position, Some(8));
    }

    #[tokio::test]
    async fn test_find_all_puts_zero_and_null_first_then_newest() {
        let store = InMemoryStore::new();
        let a = store.insert(new_todo(1, "a")).await.unwrap();
        let b = store.insert(new_todo(1, "b")).await.unwrap();
        let c = store.insert(new_todo(1, "c")).await.unwrap();
        store
            .bulk_reposition(
                1,
                &[
                    PositionUpdate { id: a.id, position: 0 },
                    PositionUpdate { id: b.id, position: 0 },
                ],
            )
            .await
            .unwrap();

        let order: Vec<i64> = store.find_all(1).await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(order, vec![b.id, a.id, c.id]);
    }

    #[tokio::test]
    async fn test_count_and_delete_scoped() {
        let store = InMemoryStore::new();
        let a = store.insert(new_todo(1, "a")).await.unwrap();
        store.insert(new_todo(2, "b")).await.unwrap();
        assert_eq!(store.count(1).await.unwrap(), 1);
        assert!(TodoRepository::delete(&store, a.id, 2).await.is_err());
        TodoRepository::delete(&store, a.id, 1).await.unwrap();
        assert_eq!(store.count(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_decrement_floors_at_zero() {
        let store = InMemoryStore::new();
        let cat = store.add_category(1, "c");
        store.decrement(cat).await.unwrap();
        assert_eq!(store.category_counter(cat), 0);
    }

    #[tokio::test]
    async fn test_deleting_category_detaches_todos() {
        let store = InMemoryStore::new();
        let cat = store.add_category(1, "c");
        let t = store
            .insert(NewTodo {
                category_id: Some(cat),
                ..new_todo(1, "a")
            })
            .await
            .unwrap();
        CategoryRepository::delete(&store, cat, 1).await.unwrap();
        assert_eq!(store.find_one(t.id, 1).await.unwrap().category_id, None);
    }

    #[tokio::test]
    async fn test_principal_lookup() {
        let store = InMemoryStore::new();
        store.add_api_key("secret", 9);
        assert_eq!(store.resolve("secret").await.unwrap(), Some(9));
        assert_eq!(store.resolve("nope").await.unwrap(), None);
    }
}
