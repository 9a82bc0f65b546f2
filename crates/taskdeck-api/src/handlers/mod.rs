//! HTTP handlers for taskdeck-api.
//!
//! Every handler takes a [`Principal`](crate::auth::Principal) and scopes its
//! core call to that owner.

pub mod categories;
pub mod tags;
pub mod todos;

use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe; needs no credentials.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
