//! Bearer-token authentication.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use taskdeck_core::OwnerId;
use tracing::debug;

use crate::{ApiError, AppState};

/// Extractor for authenticated requests.
///
/// Reads `Authorization: Bearer <token>` and resolves it to the owning
/// principal. Handlers that take `Principal` are unreachable without a valid
/// token; every core call is scoped to `principal.owner`.
///
/// ```ignore
/// async fn handler(principal: Principal, State(state): State<AppState>) -> ... {
///     state.todos.list(principal.owner).await
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub owner: OwnerId,
}

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(ApiError::unauthorized)?;

        match state.principals.resolve(token).await? {
            Some(owner) => Ok(Principal { owner }),
            None => {
                debug!(subsystem = "api", component = "auth", "Rejected bearer token");
                Err(ApiError::unauthorized())
            }
        }
    }
}
