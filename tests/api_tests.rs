use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use common_watchlist_api::{
    api::{create_router, AppState},
    config::{ApiKey, Pacing},
    models::TmdbMovie,
    services::{
        letterboxd::FetchError,
        providers::ProviderError,
        CommonMovies, Letterboxd, MetadataProvider, PageFetcher, PipelineSettings,
    },
};

const SITE: &str = "https://letterboxd.test";
const REJECTED_KEY: &str = "rejected-key-0000";

/// Letterboxd stand-in: one profile and one watchlist page per user
#[derive(Default)]
struct FakeLetterboxd {
    pages: HashMap<String, String>,
}

impl FakeLetterboxd {
    fn user(mut self, name: &str, titles: &[&str]) -> Self {
        self.pages.insert(
            format!("{SITE}/{name}/"),
            format!(r#"<html><head><meta property="og:image" content="https://img.test/{name}.jpg" /></head></html>"#),
        );
        let posters: String = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                format!(
                    r#"<li class="poster-container"><div class="film-poster" data-target-link="/film/{i}-{name}/"><img alt="{title}" /></div></li>"#
                )
            })
            .collect();
        self.pages.insert(
            format!("{SITE}/{name}/watchlist/"),
            format!("<html><body><ul>{posters}</ul></body></html>"),
        );
        self
    }
}

#[async_trait::async_trait]
impl PageFetcher for FakeLetterboxd {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.pages.get(url).cloned().ok_or(FetchError::Status(404))
    }
}

/// TMDB stand-in keyed by search string, recording the keys it saw
#[derive(Default)]
struct FakeTmdb {
    movies: HashMap<String, (u64, f64)>,
    keys_seen: Mutex<Vec<String>>,
}

impl FakeTmdb {
    fn movie(mut self, query: &str, id: u64, rating: f64) -> Self {
        self.movies.insert(query.to_string(), (id, rating));
        self
    }
}

#[async_trait::async_trait]
impl MetadataProvider for FakeTmdb {
    async fn search_movie(
        &self,
        key: &ApiKey,
        query: &str,
        _year: Option<u16>,
    ) -> Result<Vec<u64>, ProviderError> {
        self.keys_seen.lock().unwrap().push(key.expose().to_string());
        if key.expose() == REJECTED_KEY {
            return Err(ProviderError::Status(401));
        }
        if query == "interstellar" {
            return Ok(vec![157336, 301959]);
        }
        Ok(self.movies.get(query).map(|(id, _)| vec![*id]).unwrap_or_default())
    }

    async fn movie_details(&self, _key: &ApiKey, id: u64) -> Result<TmdbMovie, ProviderError> {
        let rating = self
            .movies
            .values()
            .find(|(movie_id, _)| *movie_id == id)
            .map(|(_, rating)| *rating);
        Ok(TmdbMovie {
            id,
            vote_average: rating,
            ..TmdbMovie::default()
        })
    }

    fn name(&self) -> &'static str {
        "fake-tmdb"
    }
}

fn server_with(site: FakeLetterboxd, tmdb: Arc<FakeTmdb>, fallback_key: Option<&str>) -> TestServer {
    let provider: Arc<dyn MetadataProvider> = tmdb;
    let settings = PipelineSettings {
        pacing: Pacing::immediate(),
        image_base_url: "https://image.test/t/p".to_string(),
        max_concurrent_fetches: 4,
        deadline: Duration::from_secs(5),
    };
    let pipeline = CommonMovies::new(
        Letterboxd::new(Arc::new(site), SITE, Duration::ZERO),
        provider.clone(),
        settings,
    );
    let state = AppState::new(pipeline, provider, fallback_key.map(str::to_string));
    TestServer::new(create_router(state)).unwrap()
}

fn film_club() -> FakeLetterboxd {
    FakeLetterboxd::default()
        .user("alice", &["Dune (2021)", "Arrival (2016)", "Heat (1995)"])
        .user("bob", &["Arrival (2016)", "Dune (2021)", "Solaris (1972)"])
        .user("carol", &["Arrival (2016)", "Solaris (1972)"])
}

fn catalog() -> FakeTmdb {
    FakeTmdb::default()
        .movie("Dune", 438631, 7.8)
        .movie("Arrival", 329865, 7.6)
        .movie("Solaris", 593, 8.1)
}

#[tokio::test]
async fn test_health_check() {
    let server = server_with(FakeLetterboxd::default(), Arc::new(FakeTmdb::default()), None);
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_common_movies_ranked() {
    let server = server_with(film_club(), Arc::new(catalog()), Some("server-key-12345"));

    let response = server
        .post("/api/v1/common-movies")
        .json(&json!({ "usernames": ["alice", "bob", "carol"] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 3);

    let movies = body["movies"].as_array().unwrap();
    let titles: Vec<&str> = movies.iter().map(|m| m["title"].as_str().unwrap()).collect();
    // Arrival has three contributors; Solaris and Dune tie on two, Solaris rates higher
    assert_eq!(titles, vec!["Arrival (2016)", "Solaris (1972)", "Dune (2021)"]);

    assert_eq!(movies[0]["count"], 3);
    assert_eq!(movies[0]["formatted_rating"], "7.6");
    assert_eq!(movies[0]["users"][0]["name"], "alice");
    assert_eq!(movies[0]["users"][0]["avatar"], "https://img.test/alice.jpg");
    assert_eq!(movies[2]["url"], format!("{SITE}/film/0-alice/"));
    assert!(titles.iter().all(|t| *t != "Heat (1995)"));
}

#[tokio::test]
async fn test_unknown_user_fails_whole_request() {
    let server = server_with(film_club(), Arc::new(catalog()), Some("server-key-12345"));

    let response = server
        .post("/api/v1/common-movies")
        .json(&json!({ "usernames": ["alice", "nobody"] }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("'nobody'"));
    assert!(body.get("movies").is_none());
}

#[tokio::test]
async fn test_without_key_movies_get_placeholders() {
    let tmdb = Arc::new(catalog());
    let server = server_with(film_club(), tmdb.clone(), Some("short"));

    let response = server
        .post("/api/v1/common-movies")
        .json(&json!({ "usernames": ["alice", "bob"] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let movies = body["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 2);
    for movie in movies {
        assert_eq!(movie["formatted_rating"], "N/A");
        assert_eq!(movie["overview"], "No overview available.");
        assert!(movie["genres"].as_array().unwrap().is_empty());
    }
    assert!(tmdb.keys_seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_request_key_overrides_server_key() {
    let tmdb = Arc::new(catalog());
    let server = server_with(film_club(), tmdb.clone(), None);

    let response = server
        .post("/api/v1/common-movies")
        .json(&json!({ "usernames": ["alice", "bob"], "tmdb_api_key": "request-key-6789" }))
        .await;

    response.assert_status_ok();
    let keys = tmdb.keys_seen.lock().unwrap();
    assert!(!keys.is_empty());
    assert!(keys.iter().all(|k| k == "request-key-6789"));
}

#[tokio::test]
async fn test_nothing_in_common_is_empty_list() {
    let site = FakeLetterboxd::default()
        .user("alice", &["Heat (1995)"])
        .user("bob", &["Dune (2021)"]);
    let server = server_with(site, Arc::new(catalog()), None);

    let response = server
        .post("/api/v1/common-movies")
        .json(&json!({ "usernames": ["alice", "bob"] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 0);
    assert!(body["movies"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_no_usernames_is_bad_request() {
    let server = server_with(film_club(), Arc::new(catalog()), None);

    let response = server
        .post("/api/v1/common-movies")
        .json(&json!({ "usernames": [] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = server_with(FakeLetterboxd::default(), Arc::new(FakeTmdb::default()), None);
    let id = "5f0c6f0e-8a4e-4d55-9a3b-2f7f2b8f9c11";

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;

    response.assert_status_ok();
    let echoed = response.headers().get("x-request-id").unwrap();
    assert_eq!(echoed.to_str().unwrap(), id);
}

#[tokio::test]
async fn test_metadata_key_check() {
    let server = server_with(FakeLetterboxd::default(), Arc::new(FakeTmdb::default()), Some("server-key-12345"));

    let response = server.post("/api/v1/metadata/check").json(&json!({})).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "TMDB API key is working! Found 2 results for 'Interstellar'"
    );
}

#[tokio::test]
async fn test_metadata_key_check_rejected_key() {
    let server = server_with(FakeLetterboxd::default(), Arc::new(FakeTmdb::default()), None);

    let response = server
        .post("/api/v1/metadata/check")
        .json(&json!({ "tmdb_api_key": REJECTED_KEY }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid TMDB API key");

    let response = server.post("/api/v1/metadata/check").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "TMDB API key not configured");
}
