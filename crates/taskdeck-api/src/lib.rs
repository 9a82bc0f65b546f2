//! # taskdeck-api
//!
//! HTTP surface for taskdeck: bearer authentication, JSON handlers for todos,
//! categories and tags, and the mapping from core errors to status codes.
//!
//! The router is built from an [`AppState`] of trait objects, so tests can
//! drive it against the in-memory store while the binary wires PostgreSQL.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use taskdeck_core::{
    CatalogService, PrincipalResolver, TodoSearchEngine, TodoSearchProvider, TodoService,
};
use taskdeck_db::{
    Database, PgCategoryRepository, PgOwnershipValidator, PgPrincipalResolver, PgTagRepository,
    PgTodoRepository, PgTodoSearch,
};

pub use auth::Principal;
pub use config::ApiConfig;
pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub todos: TodoService,
    pub search: TodoSearchEngine,
    pub catalog: CatalogService,
    pub principals: Arc<dyn PrincipalResolver>,
}

impl AppState {
    pub fn new(
        todos: TodoService,
        search: TodoSearchEngine,
        catalog: CatalogService,
        principals: Arc<dyn PrincipalResolver>,
    ) -> Self {
        Self {
            todos,
            search,
            catalog,
            principals,
        }
    }

    /// Wire every engine to the PostgreSQL repositories of `db`.
    pub fn from_database(db: &Database) -> Self {
        let pool = db.pool().clone();
        let categories = Arc::new(PgCategoryRepository::new(pool.clone()));
        let search: Arc<dyn TodoSearchProvider> = Arc::new(PgTodoSearch::new(pool.clone()));

        Self {
            todos: TodoService::new(
                Arc::new(PgTodoRepository::new(pool.clone())),
                Arc::new(PgOwnershipValidator::new(pool.clone())),
                categories.clone(),
            ),
            search: TodoSearchEngine::new(search),
            catalog: CatalogService::new(categories, Arc::new(PgTagRepository::new(pool.clone()))),
            principals: Arc::new(PgPrincipalResolver::new(pool)),
        }
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Build the full router: `/health` plus the authenticated `/api/v1` routes.
pub fn build_router(state: AppState, config: &ApiConfig) -> Router {
    use handlers::{categories, tags, todos};

    let api = Router::new()
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        // Static segments must be registered alongside /todos/:id; matchit
        // prefers them over the parameter.
        .route("/todos/search", get(todos::search_todos))
        .route("/todos/update_order", patch(todos::update_order))
        .route(
            "/todos/:id",
            get(todos::get_todo)
                .patch(todos::update_todo)
                .put(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/:id",
            get(categories::get_category)
                .patch(categories::update_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/categories/:id/recalculate",
            post(categories::recalculate_category),
        )
        .route("/tags", get(tags::list_tags).post(tags::create_tag))
        .route(
            "/tags/:id",
            get(tags::get_tag)
                .patch(tags::update_tag)
                .put(tags::update_tag)
                .delete(tags::delete_tag),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .max_age(Duration::from_secs(3600)),
        )
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .with_state(state)
}
