//! Todo HTTP handlers.
//!
//! Request bodies are wrapped in a `todo` key and single-todo responses
//! mirror that: `{"todo": {...}}`. Lists come back as `{"todos": [...]}`.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskdeck_core::{CreateTodoRequest, PositionUpdate, SearchTodosRequest, UpdateTodoRequest};

use crate::auth::Principal;
use crate::extract::{IdPath, ValidJson, ValidQuery};
use crate::{ApiError, AppState};

/// `{"todo": {...}}` request envelope.
#[derive(Debug, Deserialize)]
pub struct TodoBody<T> {
    pub todo: T,
}

/// `{"todos": [{"id", "position"}, ...]}` reorder body.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderBody {
    pub todos: Vec<PositionUpdate>,
}

/// List the caller's todos in display order.
///
/// # Returns
/// - 200 OK with `{"todos": [...]}`
pub async fn list_todos(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let todos = state.todos.list(principal.owner).await?;
    Ok(Json(json!({ "todos": todos })))
}

/// Fetch one todo with its category and tags.
///
/// # Returns
/// - 200 OK with `{"todo": {...}}`
/// - 404 Not Found if the id does not exist for this owner
pub async fn get_todo(
    principal: Principal,
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Value>, ApiError> {
    let todo = state.todos.get(id, principal.owner).await?;
    Ok(Json(json!({ "todo": todo })))
}

/// Create a todo.
///
/// # Returns
/// - 201 Created with `{"todo": {...}}`
/// - 422 Unprocessable Entity for bad fields, past due dates, or foreign
///   category/tag references
pub async fn create_todo(
    principal: Principal,
    State(state): State<AppState>,
    ValidJson(body): ValidJson<TodoBody<CreateTodoRequest>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let todo = state.todos.create(principal.owner, body.todo).await?;
    Ok((StatusCode::CREATED, Json(json!({ "todo": todo }))))
}

/// Partially update a todo. Absent keys are left alone, `null` clears.
pub async fn update_todo(
    principal: Principal,
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<TodoBody<UpdateTodoRequest>>,
) -> Result<Json<Value>, ApiError> {
    let todo = state.todos.update(id, principal.owner, body.todo).await?;
    Ok(Json(json!({ "todo": todo })))
}

/// Delete a todo.
///
/// # Returns
/// - 204 No Content
/// - 404 Not Found if the id does not exist for this owner
pub async fn delete_todo(
    principal: Principal,
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    state.todos.delete(id, principal.owner).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply a batch of position changes. Ids the caller does not own are skipped.
pub async fn update_order(
    principal: Principal,
    State(state): State<AppState>,
    ValidJson(body): ValidJson<UpdateOrderBody>,
) -> Result<Json<Value>, ApiError> {
    state.todos.update_order(principal.owner, &body.todos).await?;
    Ok(Json(json!({ "message": "Order updated successfully" })))
}

/// Filtered, sorted, paginated search.
///
/// # Returns
/// - 200 OK with `{"todos": [...], "meta": {...}}`
/// - 422 Unprocessable Entity naming each invalid parameter
pub async fn search_todos(
    principal: Principal,
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<SearchTodosRequest>,
) -> Result<Json<Value>, ApiError> {
    let result = state.search.search(principal.owner, &params).await?;
    let total_pages = result.total_pages();

    Ok(Json(json!({
        "todos": result.todos,
        "meta": {
            "total": result.total,
            "current_page": result.page,
            "total_pages": total_pages,
            "per_page": result.per_page,
            "filters_applied": result.filters_applied,
        },
    })))
}
