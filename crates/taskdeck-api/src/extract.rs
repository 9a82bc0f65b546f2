//! Request extraction with validation-shaped rejections.
//!
//! The stock axum extractors reject with plain-text bodies. These wrappers
//! report failures through [`ApiError`] so every error a client sees has the
//! same JSON shape.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use serde_path_to_error::Segment;
use taskdeck_core::ValidationErrors;

use crate::ApiError;

pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";
pub const INVALID_QUERY_MESSAGE: &str = "Invalid query string";
pub const INVALID_ID_MESSAGE: &str = "must be an integer";

const ENUM_RANGE_MESSAGE: &str = "must be one of: 0, 1, 2";

/// Body fields whose values are the 0/1/2 enums.
const ENUM_FIELDS: [&str; 2] = ["priority", "status"];

/// JSON body extractor.
///
/// Unlike `axum::Json`, a malformed or mistyped body is reported as a
/// validation failure (`{"body": ["Invalid request body"]}`). A value that
/// fails to deserialize at a `priority` or `status` key names that field.
/// Failures to read the body at all (e.g. over the size limit) keep the
/// status axum assigns them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Rejected(rejection.status(), rejection.body_text()))?;

        parse_body(&bytes).map(ValidJson).map_err(ApiError::Validation)
    }
}

/// Deserialize a JSON body, attributing enum failures to their field.
pub(crate) fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ValidationErrors> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut de).map_err(|e| body_errors(&e))?;
    de.end()
        .map_err(|_| ValidationErrors::field("body", INVALID_BODY_MESSAGE))?;
    Ok(value)
}

fn body_errors(err: &serde_path_to_error::Error<serde_json::Error>) -> ValidationErrors {
    if err.inner().classify() == Category::Data {
        if let Some(Segment::Map { key }) = err.path().iter().last() {
            if ENUM_FIELDS.contains(&key.as_str()) {
                return ValidationErrors::field(key.as_str(), ENUM_RANGE_MESSAGE);
            }
        }
    }
    ValidationErrors::field("body", INVALID_BODY_MESSAGE)
}

/// Query string extractor rejecting with `{"query": ["Invalid query string"]}`.
#[derive(Debug, Clone, Default)]
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ValidQuery(value))
            .map_err(|_| ApiError::Validation(ValidationErrors::field("query", INVALID_QUERY_MESSAGE)))
    }
}

/// The `:id` segment of a resource route.
///
/// A non-integer segment is a validation failure on `id` rather than a
/// plain-text 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<i64>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| IdPath(id))
            .map_err(|_| ApiError::Validation(ValidationErrors::field("id", INVALID_ID_MESSAGE)))
    }
}
