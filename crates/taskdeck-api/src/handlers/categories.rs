//! Category HTTP handlers.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskdeck_core::{CreateCategoryRequest, UpdateCategoryRequest};

use crate::auth::Principal;
use crate::extract::{IdPath, ValidJson};
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct CategoryBody<T> {
    pub category: T,
}

pub async fn list_categories(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let categories = state.catalog.list_categories(principal.owner).await?;
    Ok(Json(json!({ "categories": categories })))
}

pub async fn get_category(
    principal: Principal,
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Value>, ApiError> {
    let category = state.catalog.get_category(id, principal.owner).await?;
    Ok(Json(json!({ "category": category })))
}

/// Create a category. Duplicate names fail with `{"name": ["has already been taken"]}`.
pub async fn create_category(
    principal: Principal,
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CategoryBody<CreateCategoryRequest>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let category = state
        .catalog
        .create_category(principal.owner, body.category)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "category": category }))))
}

pub async fn update_category(
    principal: Principal,
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<CategoryBody<UpdateCategoryRequest>>,
) -> Result<Json<Value>, ApiError> {
    let category = state
        .catalog
        .update_category(id, principal.owner, body.category)
        .await?;
    Ok(Json(json!({ "category": category })))
}

/// Delete a category; its todos become uncategorized.
pub async fn delete_category(
    principal: Principal,
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_category(id, principal.owner).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rebuild the category's todo counter from the todo rows.
///
/// # Returns
/// - 200 OK with the refreshed `{"category": {...}}`
/// - 404 Not Found if the category does not exist for this owner
pub async fn recalculate_category(
    principal: Principal,
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Value>, ApiError> {
    state
        .todos
        .recalculate_category_count(principal.owner, id)
        .await?;
    let category = state.catalog.get_category(id, principal.owner).await?;
    Ok(Json(json!({ "category": category })))
}
