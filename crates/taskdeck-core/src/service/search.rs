//! Search/filter engine: validates raw input, then runs it against a provider.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument};

use crate::error::Result;
use crate::models::OwnerId;
use crate::search::{SearchTodosRequest, TodoSearchQuery, TodoSearchResponse};
use crate::traits::TodoSearchProvider;

#[derive(Clone)]
pub struct TodoSearchEngine {
    provider: Arc<dyn TodoSearchProvider>,
}

impl TodoSearchEngine {
    pub fn new(provider: Arc<dyn TodoSearchProvider>) -> Self {
        Self { provider }
    }

    /// Validate `req` and return one page of the owner's matching todos.
    ///
    /// Invalid input fails before the provider is consulted.
    #[instrument(skip(self, req), fields(
        subsystem = "core",
        component = "todo_search",
        op = "search",
        owner_id = owner,
    ))]
    pub async fn search(
        &self,
        owner: OwnerId,
        req: &SearchTodosRequest,
    ) -> Result<TodoSearchResponse> {
        let start = Instant::now();
        let query = TodoSearchQuery::from_request(req)?;
        debug!(?query, "Validated search query");

        let page = self.provider.search(owner, &query).await?;

        debug!(
            result_count = page.todos.len(),
            total = page.total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );

        Ok(TodoSearchResponse {
            todos: page.todos,
            total: page.total,
            page: query.page,
            per_page: query.per_page,
            filters_applied: query.has_filters(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::InMemoryStore;
    use crate::models::{CreateTodoRequest, Priority, Status};
    use crate::service::TodoService;
    use crate::temporal::FixedClock;
    use chrono::NaiveDate;

    const ALICE: OwnerId = 1;
    const BOB: OwnerId = 2;

    fn setup() -> (Arc<InMemoryStore>, TodoService, TodoSearchEngine) {
        let store = Arc::new(InMemoryStore::new());
        let svc = TodoService::new(store.clone(), store.clone(), store.clone()).with_clock(
            Arc::new(FixedClock(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())),
        );
        let engine = TodoSearchEngine::new(store.clone());
        (store, svc, engine)
    }

    fn req() -> SearchTodosRequest {
        SearchTodosRequest::default()
    }

    #[tokio::test]
    async fn test_pagination_totals() {
        let (_store, svc, engine) = setup();
        for i in 0..25 {
            svc.create(ALICE, CreateTodoRequest::titled(format!("match {}", i)))
                .await
                .unwrap();
        }
        svc.create(ALICE, CreateTodoRequest::titled("other"))
            .await
            .unwrap();

        let mut sizes = Vec::new();
        for page in 1..=3 {
            let resp = engine
                .search(
                    ALICE,
                    &SearchTodosRequest {
                        q: Some("match".into()),
                        page: Some(page.to_string()),
                        per_page: Some("10".into()),
                        ..req()
                    },
                )
                .await
                .unwrap();
            assert_eq!(resp.total, 25);
            assert_eq!(resp.total_pages(), 3);
            assert!(resp.filters_applied);
            sizes.push(resp.todos.len());
        }
        assert_eq!(sizes, vec![10, 10, 5]);
    }

    #[tokio::test]
    async fn test_bogus_sort_by_fails_before_query() {
        let (_store, _svc, engine) = setup();
        let err = engine
            .search(
                ALICE,
                &SearchTodosRequest {
                    sort_by: Some("bogus".into()),
                    ..req()
                },
            )
            .await
            .unwrap_err();
        assert!(err.validation_errors().unwrap().has_field("sort_by"));
    }

    #[tokio::test]
    async fn test_results_are_owner_scoped() {
        let (_store, svc, engine) = setup();
        svc.create(ALICE, CreateTodoRequest::titled("mine"))
            .await
            .unwrap();
        svc.create(BOB, CreateTodoRequest::titled("theirs"))
            .await
            .unwrap();

        let resp = engine.search(ALICE, &req()).await.unwrap();
        assert_eq!(resp.total, 1);
        assert_eq!(resp.todos[0].todo.title, "mine");
        assert!(!resp.filters_applied);
    }

    #[tokio::test]
    async fn test_status_priority_and_category_filters() {
        let (store, svc, engine) = setup();
        let cat = store.add_category(ALICE, "Work");
        svc.create(
            ALICE,
            CreateTodoRequest {
                category_id: Some(cat),
                priority: Some(Priority::High),
                status: Some(Status::InProgress),
                ..CreateTodoRequest::titled("a")
            },
        )
        .await
        .unwrap();
        svc.create(ALICE, CreateTodoRequest::titled("b"))
            .await
            .unwrap();

        let resp = engine
            .search(
                ALICE,
                &SearchTodosRequest {
                    status: Some("1,2".into()),
                    priority: Some("2".into()),
                    ..req()
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.total, 1);
        assert_eq!(resp.todos[0].todo.title, "a");

        let resp = engine
            .search(
                ALICE,
                &SearchTodosRequest {
                    category_id: Some("none".into()),
                    ..req()
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.total, 1);
        assert_eq!(resp.todos[0].todo.title, "b");

        let resp = engine
            .search(
                ALICE,
                &SearchTodosRequest {
                    category_id: Some(cat.to_string()),
                    ..req()
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.todos[0].todo.title, "a");
    }

    #[tokio::test]
    async fn test_tag_modes() {
        let (store, svc, engine) = setup();
        let x = store.add_tag(ALICE, "x");
        let y = store.add_tag(ALICE, "y");
        for (title, tags) in [("both", vec![x, y]), ("only x", vec![x]), ("none", vec![])] {
            svc.create(
                ALICE,
                CreateTodoRequest {
                    tag_ids: Some(tags),
                    ..CreateTodoRequest::titled(title)
                },
            )
            .await
            .unwrap();
        }

        let ids = format!("{},{}", x, y);
        let any = engine
            .search(
                ALICE,
                &SearchTodosRequest {
                    tag_ids: Some(ids.clone()),
                    ..req()
                },
            )
            .await
            .unwrap();
        assert_eq!(any.total, 2);

        let all = engine
            .search(
                ALICE,
                &SearchTodosRequest {
                    tag_ids: Some(ids),
                    tag_mode: Some("all".into()),
                    ..req()
                },
            )
            .await
            .unwrap();
        assert_eq!(all.total, 1);
        assert_eq!(all.todos[0].todo.title, "both");
    }

    #[tokio::test]
    async fn test_due_range_is_inclusive_and_sortable() {
        let (_store, svc, engine) = setup();
        for (title, due) in [
            ("jan", "2030-01-01"),
            ("feb", "2030-02-01"),
            ("mar", "2030-03-01"),
        ] {
            svc.create(
                ALICE,
                CreateTodoRequest {
                    due_date: Some(due.into()),
                    ..CreateTodoRequest::titled(title)
                },
            )
            .await
            .unwrap();
        }

        let resp = engine
            .search(
                ALICE,
                &SearchTodosRequest {
                    due_date_from: Some("2030-01-01".into()),
                    due_date_to: Some("2030-02-01".into()),
                    sort_by: Some("due_date".into()),
                    sort_order: Some("asc".into()),
                    ..req()
                },
            )
            .await
            .unwrap();
        let titles: Vec<_> = resp.todos.iter().map(|t| t.todo.title.as_str()).collect();
        assert_eq!(titles, vec!["jan", "feb"]);
    }

    #[tokio::test]
    async fn test_text_match_is_case_insensitive_on_title_or_description() {
        let (_store, svc, engine) = setup();
        svc.create(ALICE, CreateTodoRequest::titled("Buy MILK"))
            .await
            .unwrap();
        svc.create(
            ALICE,
            CreateTodoRequest {
                description: Some("remember the milk".into()),
                ..CreateTodoRequest::titled("errand")
            },
        )
        .await
        .unwrap();
        svc.create(ALICE, CreateTodoRequest::titled("unrelated"))
            .await
            .unwrap();

        let resp = engine
            .search(
                ALICE,
                &SearchTodosRequest {
                    q: Some("milk".into()),
                    ..req()
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.total, 2);
    }
}
