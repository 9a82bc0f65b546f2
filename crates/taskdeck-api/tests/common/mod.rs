//! Router harness backed by the in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use taskdeck_api::{build_router, ApiConfig, AppState};
use taskdeck_core::mock::InMemoryStore;
use taskdeck_core::{CatalogService, TodoSearchEngine, TodoService};

pub const ALICE: i64 = 1;
pub const BOB: i64 = 2;
pub const ALICE_TOKEN: &str = "tdk-alice";
pub const BOB_TOKEN: &str = "tdk-bob";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        store.add_api_key(ALICE_TOKEN, ALICE);
        store.add_api_key(BOB_TOKEN, BOB);

        let state = AppState::new(
            TodoService::new(store.clone(), store.clone(), store.clone()),
            TodoSearchEngine::new(store.clone()),
            CatalogService::new(store.clone(), store.clone()),
            store.clone(),
        );

        Self {
            router: build_router(state, &ApiConfig::default()),
            store,
        }
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Send raw bytes as the request body.
    pub async fn send_raw(&self, method: &str, uri: &str, token: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", token))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("PATCH", uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, Some(token), None).await
    }

    /// Create a todo through the API and return its id.
    pub async fn create_todo(&self, token: &str, todo: Value) -> i64 {
        let (status, body) = self
            .post("/api/v1/todos", token, serde_json::json!({ "todo": todo }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body["todo"]["id"].as_i64().unwrap()
    }
}
