use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use marquee_api::{
    error::{AppError, AppResult},
    models::{CatalogId, CatalogRecord, CatalogSummary, TitleKind},
    routes::{create_router, AppState},
    services::providers::{
        CatalogDetailProvider, CatalogSearchProvider, InsightGenerator, SuggestionGenerator,
    },
};

/// Catalog answering from fixed tables; the query "boom" fails
#[derive(Default)]
struct StubCatalog {
    searches: HashMap<String, Vec<CatalogSummary>>,
    records: HashMap<String, CatalogRecord>,
}

impl StubCatalog {
    fn with_movies(mut self, query: &str, movies: &[(&str, &str)]) -> Self {
        let hits = movies
            .iter()
            .map(|(id, title)| CatalogSummary {
                id: CatalogId::new(*id),
                title: title.to_string(),
                year: Some("2008".to_string()),
                poster_url: None,
                kind: TitleKind::Movie,
            })
            .collect();
        self.searches.insert(query.to_lowercase(), hits);
        for (id, title) in movies {
            self.records
                .insert(id.to_string(), CatalogRecord::new(*id, *title));
        }
        self
    }
}

#[async_trait::async_trait]
impl CatalogSearchProvider for StubCatalog {
    async fn search(&self, query: &str, _page: u32) -> AppResult<Vec<CatalogSummary>> {
        if query == "boom" {
            return Err(AppError::ExternalApi("upstream down".to_string()));
        }
        Ok(self
            .searches
            .get(&query.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

#[async_trait::async_trait]
impl CatalogDetailProvider for StubCatalog {
    async fn fetch_details(&self, id: &CatalogId) -> AppResult<Option<CatalogRecord>> {
        Ok(self.records.get(id.as_str()).cloned())
    }
}

/// Suggests from a prompt table; the prompt "hang" never answers
struct StubGenerator {
    suggestions: HashMap<String, Vec<String>>,
}

#[async_trait::async_trait]
impl SuggestionGenerator for StubGenerator {
    async fn suggest(&self, prompt: &str) -> Vec<String> {
        if prompt == "hang" {
            std::future::pending::<()>().await;
        }
        self.suggestions.get(prompt).cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl InsightGenerator for StubGenerator {
    async fn storyline(&self, title: &str) -> Option<String> {
        Some(format!("{} follows a hero in trouble.", title))
    }

    async fn age_rating(&self, _title: &str) -> Option<String> {
        Some("PG-13".to_string())
    }
}

fn create_test_app() -> (TestServer, Arc<AppState>) {
    let catalog = Arc::new(
        StubCatalog::default()
            .with_movies(
                "batman",
                &[("tt0372784", "Batman Begins"), ("tt0468569", "The Dark Knight")],
            )
            .with_movies("avengers", &[("tt0848228", "The Avengers")])
            .with_movies("heat", &[("tt0113277", "Heat")])
            .with_movies("ronin", &[("tt0122690", "Ronin")])
            .with_movies("thief", &[("tt0083190", "Thief")]),
    );
    let generator = Arc::new(StubGenerator {
        suggestions: HashMap::from([(
            "gritty crime".to_string(),
            vec!["Heat".to_string(), "Ronin".to_string(), "Thief".to_string()],
        )]),
    });

    let state = Arc::new(AppState::new(
        catalog.clone(),
        catalog,
        generator.clone(),
        generator,
    ));
    let app = create_router(state.clone());
    (TestServer::new(app).unwrap(), state)
}

fn create_test_server() -> TestServer {
    create_test_app().0
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_request_id_generated_and_propagated() {
    let server = create_test_server();

    let response = server.get("/health").await;
    let generated = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(generated.to_str().unwrap()).is_ok());

    let id = "6f1c1f3e-5a0b-4d4e-9a55-2f4a0a3b9c11";
    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;
    assert_eq!(response.header("x-request-id"), id);
}

#[tokio::test]
async fn test_search_titles() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/titles/search")
        .add_query_param("q", "Batman")
        .await;

    response.assert_status_ok();
    let titles: Vec<Value> = response.json();
    assert_eq!(titles.len(), 2);
    assert_eq!(titles[0]["id"], "tt0372784");
    assert_eq!(titles[0]["title"], "Batman Begins");
}

#[tokio::test]
async fn test_search_requires_query() {
    let server = create_test_server();

    let response = server.get("/api/v1/titles/search").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/v1/titles/search")
        .add_query_param("q", "   ")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_search_upstream_failure() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/titles/search")
        .add_query_param("q", "boom")
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_title_details() {
    let server = create_test_server();

    let response = server.get("/api/v1/titles/tt0468569").await;
    response.assert_status_ok();
    let record: Value = response.json();
    assert_eq!(record["title"], "The Dark Knight");

    let response = server.get("/api/v1/titles/tt0000000").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_title_insights() {
    let server = create_test_server();

    let response = server.get("/api/v1/titles/tt0113277/insights").await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "storyline": "Heat follows a hero in trouble.",
        "age_rating": "PG-13"
    }));
}

#[tokio::test]
async fn test_browse_rows() {
    let server = create_test_server();

    let response = server.get("/api/v1/browse").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["title"], "Trending Movies");
    assert_eq!(rows[0]["movies"].as_array().unwrap().len(), 2);
    assert_eq!(rows[2]["movies"].as_array().unwrap().len(), 0);
    assert_eq!(body["featured"]["id"], "tt0372784");
}

#[tokio::test]
async fn test_recommendations() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "prompt": "gritty crime" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let ids: Vec<&str> = body["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["tt0113277", "tt0122690", "tt0083190"]);
    assert!(body["diagnostic"].is_null());
}

#[tokio::test]
async fn test_recommendations_falls_back_to_prompt_search() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "prompt": "batman" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["records"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_recommendations_no_results_diagnostic() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "prompt": "xyzzy nothing matches" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["records"].as_array().unwrap().len(), 0);
    assert_eq!(body["diagnostic"]["kind"], "no_results");
}

#[tokio::test]
async fn test_recommendations_blank_prompt() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "prompt": "  " }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_newer_request_supersedes_older_in_same_session() {
    let server = create_test_server();

    let first = async {
        server
            .post("/api/v1/recommendations")
            .json(&json!({ "prompt": "hang", "session_id": "s1" }))
            .await
    };
    let second = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        server
            .post("/api/v1/recommendations")
            .json(&json!({ "prompt": "gritty crime", "session_id": "s1" }))
            .await
    };

    let (first, second) = tokio::join!(first, second);

    first.assert_status(StatusCode::CONFLICT);
    second.assert_status_ok();
    let body: Value = second.json();
    assert_eq!(body["records"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_abandoned_requests_release_their_sessions() {
    let (server, state) = create_test_app();

    for i in 0..5 {
        let request = server
            .post("/api/v1/recommendations")
            .json(&json!({ "prompt": "hang", "session_id": format!("gone-{}", i) }));
        let outcome = tokio::time::timeout(Duration::from_millis(20), async { request.await }).await;
        assert!(outcome.is_err());
    }

    assert_eq!(state.sessions.active_sessions(), 0);
}
