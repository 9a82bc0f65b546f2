//! Tag HTTP handlers.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskdeck_core::{CreateTagRequest, UpdateTagRequest};

use crate::auth::Principal;
use crate::extract::{IdPath, ValidJson};
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct TagBody<T> {
    pub tag: T,
}

pub async fn list_tags(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let tags = state.catalog.list_tags(principal.owner).await?;
    Ok(Json(json!({ "tags": tags })))
}

pub async fn get_tag(
    principal: Principal,
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Value>, ApiError> {
    let tag = state.catalog.get_tag(id, principal.owner).await?;
    Ok(Json(json!({ "tag": tag })))
}

/// Create a tag. Names are stored lowercased.
pub async fn create_tag(
    principal: Principal,
    State(state): State<AppState>,
    ValidJson(body): ValidJson<TagBody<CreateTagRequest>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let tag = state.catalog.create_tag(principal.owner, body.tag).await?;
    Ok((StatusCode::CREATED, Json(json!({ "tag": tag }))))
}

pub async fn update_tag(
    principal: Principal,
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<TagBody<UpdateTagRequest>>,
) -> Result<Json<Value>, ApiError> {
    let tag = state.catalog.update_tag(id, principal.owner, body.tag).await?;
    Ok(Json(json!({ "tag": tag })))
}

pub async fn delete_tag(
    principal: Principal,
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_tag(id, principal.owner).await?;
    Ok(StatusCode::NO_CONTENT)
}
