use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum_test::TestServer;
use serde_json::json;

use lumiere_api::api::{create_router, AppState};
use lumiere_api::error::{AppError, AppResult};
use lumiere_api::models::{CatalogItem, CatalogPage, ContentKind, FilterSet, Genre, TitleDetails};
use lumiere_api::services::{CatalogProvider, SortKey};

const MISSING_TITLE_ID: u64 = 999_999;

/// Catalog stub serving canned data, counting discovery sweeps
struct StubCatalog {
    items: Vec<CatalogItem>,
    fail_discovery: bool,
    discover_calls: AtomicUsize,
}

impl StubCatalog {
    fn with_items(ids: &[u64]) -> Self {
        Self {
            items: ids.iter().copied().map(catalog_item).collect(),
            fail_discovery: false,
            discover_calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            items: Vec::new(),
            fail_discovery: true,
            discover_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl CatalogProvider for StubCatalog {
    async fn discover(
        &self,
        _filters: &FilterSet,
        page: u32,
        _sort: SortKey,
    ) -> AppResult<CatalogPage> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_discovery {
            return Err(AppError::Catalog {
                status: 503,
                message: "catalog unavailable".to_string(),
            });
        }

        let items = if page == 1 {
            self.items.clone()
        } else {
            Vec::new()
        };

        Ok(CatalogPage {
            items,
            total_pages: 1,
            total_results: self.items.len() as u32,
        })
    }

    async fn genres(&self, kind: ContentKind) -> AppResult<Vec<Genre>> {
        let genres = match kind {
            ContentKind::Movie => vec![
                Genre {
                    id: 28,
                    name: "Action".to_string(),
                },
                Genre {
                    id: 35,
                    name: "Comedy".to_string(),
                },
            ],
            ContentKind::Tv | ContentKind::Miniseries => vec![Genre {
                id: 18,
                name: "Drama".to_string(),
            }],
        };
        Ok(genres)
    }

    async fn details(&self, kind: ContentKind, id: u64) -> AppResult<TitleDetails> {
        if id == MISSING_TITLE_ID {
            return Err(AppError::NotFound(format!(
                "catalog resource not found: /{}/{}",
                kind.endpoint_path(),
                id
            )));
        }

        Ok(TitleDetails {
            id,
            title: format!("Title {}", id),
            original_title: None,
            overview: "A canned overview".to_string(),
            poster_path: Some("/poster.jpg".to_string()),
            backdrop_path: None,
            vote_average: 8.1,
            vote_count: 4200,
            release_date: Some("2020-02-02".to_string()),
            first_air_date: None,
            genres: vec![Genre {
                id: 28,
                name: "Action".to_string(),
            }],
            original_language: "en".to_string(),
            popularity: 55.0,
            runtime: Some(120),
            number_of_seasons: None,
            number_of_episodes: None,
        })
    }

    async fn validate_credential(&self) -> AppResult<()> {
        Ok(())
    }
}

fn catalog_item(id: u64) -> CatalogItem {
    CatalogItem {
        id,
        title: format!("Title {}", id),
        original_title: None,
        overview: String::new(),
        poster_path: None,
        backdrop_path: None,
        vote_average: 7.8,
        vote_count: 900,
        release_date: Some("2021-06-01".to_string()),
        first_air_date: None,
        genre_ids: vec![28],
        original_language: "en".to_string(),
        popularity: 12.0,
    }
}

fn create_test_server(stub: StubCatalog) -> (TestServer, Arc<StubCatalog>) {
    let stub = Arc::new(stub);
    let state = AppState::new(Arc::clone(&stub) as Arc<dyn CatalogProvider>);
    let server = TestServer::new(create_router(state)).unwrap();
    (server, stub)
}

fn suggestion_body(shown_ids: &[u64]) -> serde_json::Value {
    json!({
        "filters": {
            "kind": "movie",
            "genres": [],
            "language": "any",
            "min_rating": 7.0
        },
        "shown_ids": shown_ids
    })
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server(StubCatalog::with_items(&[]));
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_genres_per_kind() {
    let (server, _) = create_test_server(StubCatalog::with_items(&[]));

    let response = server
        .get("/api/v1/genres")
        .add_query_param("kind", "movie")
        .await;
    response.assert_status_ok();
    let genres: Vec<serde_json::Value> = response.json();
    assert_eq!(genres.len(), 2);
    assert_eq!(genres[0]["name"], "Action");

    // Miniseries listings come from the TV genre catalog
    let response = server
        .get("/api/v1/genres")
        .add_query_param("kind", "miniseries")
        .await;
    response.assert_status_ok();
    let genres: Vec<serde_json::Value> = response.json();
    assert_eq!(genres[0]["name"], "Drama");
}

#[tokio::test]
async fn test_suggestion_returns_an_item() {
    let (server, _) = create_test_server(StubCatalog::with_items(&[42]));

    let response = server
        .post("/api/v1/suggestions")
        .json(&suggestion_body(&[]))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["suggestion"]["id"], 42);
    assert_eq!(body["suggestion"]["title"], "Title 42");
}

#[tokio::test]
async fn test_no_results_is_null_not_an_error() {
    let (server, _) = create_test_server(StubCatalog::with_items(&[]));

    let response = server
        .post("/api/v1/suggestions")
        .json(&suggestion_body(&[]))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["suggestion"].is_null());
}

#[tokio::test]
async fn test_catalog_failure_maps_to_bad_gateway() {
    let (server, _) = create_test_server(StubCatalog::failing());

    let response = server
        .post("/api/v1/suggestions")
        .json(&suggestion_body(&[]))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_shown_history_walks_the_pool_then_recycles() {
    let (server, stub) = create_test_server(StubCatalog::with_items(&[1, 2]));

    let first: serde_json::Value = server
        .post("/api/v1/suggestions")
        .json(&suggestion_body(&[]))
        .await
        .json();
    let first_id = first["suggestion"]["id"].as_u64().unwrap();

    let second: serde_json::Value = server
        .post("/api/v1/suggestions")
        .json(&suggestion_body(&[first_id]))
        .await
        .json();
    let second_id = second["suggestion"]["id"].as_u64().unwrap();
    assert_ne!(first_id, second_id);

    // Everything shown: the pool recycles from its head
    let third: serde_json::Value = server
        .post("/api/v1/suggestions")
        .json(&suggestion_body(&[first_id, second_id]))
        .await
        .json();
    assert_eq!(third["suggestion"]["id"].as_u64().unwrap(), first_id);

    // All three requests shared a single discovery sweep
    assert_eq!(stub.discover_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_clear_pool_forces_a_fresh_sweep() {
    let (server, stub) = create_test_server(StubCatalog::with_items(&[1]));

    server
        .post("/api/v1/suggestions")
        .json(&suggestion_body(&[]))
        .await
        .assert_status_ok();
    assert_eq!(stub.discover_calls.load(Ordering::SeqCst), 1);

    let response = server.delete("/api/v1/suggestions/pool").await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);

    server
        .post("/api/v1/suggestions")
        .json(&suggestion_body(&[]))
        .await
        .assert_status_ok();
    assert_eq!(stub.discover_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalid_min_rating_is_rejected() {
    let (server, stub) = create_test_server(StubCatalog::with_items(&[1]));

    let response = server
        .post("/api/v1/suggestions")
        .json(&json!({
            "filters": { "kind": "movie", "min_rating": 15.0 },
            "shown_ids": []
        }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    // Rejected before any catalog traffic
    assert_eq!(stub.discover_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_title_details_passthrough() {
    let (server, _) = create_test_server(StubCatalog::with_items(&[]));

    let response = server.get("/api/v1/titles/movie/27205").await;
    response.assert_status_ok();

    let details: serde_json::Value = response.json();
    assert_eq!(details["id"], 27205);
    assert_eq!(details["runtime"], 120);
}

#[tokio::test]
async fn test_unknown_title_maps_to_not_found() {
    let (server, _) = create_test_server(StubCatalog::with_items(&[]));

    let response = server
        .get(&format!("/api/v1/titles/tv/{}", MISSING_TITLE_ID))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_responses_carry_a_request_id() {
    let (server, _) = create_test_server(StubCatalog::with_items(&[]));

    let response = server.get("/health").await;
    let header = response.header("x-request-id");
    assert!(!header.is_empty());
}
