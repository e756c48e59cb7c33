/// TMDB (The Movie Database) API provider
///
/// API Flow:
/// 1. Search: /search/movie?query=..&year=.. → candidate ids
/// 2. Details: /movie/{id}?append_to_response=credits,images → full record
///
/// The API key travels with every call instead of living in the provider, so
/// one provider instance can serve requests that bring their own key.
use crate::{
    config::ApiKey,
    error::AppResult,
    models::{TmdbMovie, TmdbSearchResponse},
    services::providers::{MetadataProvider, ProviderError},
};
use reqwest::{Client as HttpClient, StatusCode};
use std::time::Duration;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Sends a GET and maps the status line onto `ProviderError`
    async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited),
            status if !status.is_success() => Err(ProviderError::Status(status.as_u16())),
            _ => Ok(response),
        }
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_movie(
        &self,
        key: &ApiKey,
        query: &str,
        year: Option<u16>,
    ) -> Result<Vec<u64>, ProviderError> {
        let url = format!("{}/search/movie", self.api_url);
        let year = year.map(|y| y.to_string());

        let mut params = vec![("api_key", key.expose()), ("query", query)];
        if let Some(year) = year.as_deref() {
            params.push(("year", year));
        }

        let response = self.get(&url, &params).await?;
        let search: TmdbSearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.without_url().to_string()))?;

        tracing::debug!(
            query = %query,
            year = ?year,
            results = search.results.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(search.results.into_iter().map(|r| r.id).collect())
    }

    async fn movie_details(&self, key: &ApiKey, id: u64) -> Result<TmdbMovie, ProviderError> {
        let url = format!("{}/movie/{}", self.api_url, id);

        let response = self
            .get(
                &url,
                &[
                    ("api_key", key.expose()),
                    ("append_to_response", "credits,images"),
                ],
            )
            .await?;

        // Read the body first so a bad payload can be logged
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;

        serde_json::from_str::<TmdbMovie>(&body).map_err(|e| {
            tracing::error!(tmdb_id = id, error = %e, "Failed to deserialize TMDB details");
            ProviderError::Parse(e.to_string())
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
