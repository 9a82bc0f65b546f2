//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use taskdeck_core::{Error, ValidationErrors};

/// Message returned for every failure whose cause must not leak.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Message returned when a request carries no usable bearer token.
pub const AUTH_REQUIRED_MESSAGE: &str = "Authentication required";

/// Errors returned by handlers, each mapped to one status code.
#[derive(Debug)]
pub enum ApiError {
    /// 422 with field details.
    Validation(ValidationErrors),
    /// 404; the message already names the resource and id.
    NotFound(String),
    /// 401 for a missing, unknown or revoked bearer token.
    Unauthorized(String),
    /// A request axum could not read (e.g. 413 over the body limit).
    Rejected(StatusCode, String),
    /// 500; the cause is logged and never sent to the client.
    Internal(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized(AUTH_REQUIRED_MESSAGE.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Rejected(status, _) => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(errors) => ApiError::Validation(errors),
            e if e.is_not_found() => ApiError::NotFound(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(details) => json!({
                "error": "Validation failed",
                "details": details,
            }),
            ApiError::NotFound(msg) | ApiError::Unauthorized(msg) | ApiError::Rejected(_, msg) => {
                json!({ "error": msg })
            }
            ApiError::Internal(cause) => {
                tracing::error!(subsystem = "api", error = %cause, "Request failed");
                json!({ "error": INTERNAL_ERROR_MESSAGE })
            }
        };

        (status, Json(body)).into_response()
    }
}
