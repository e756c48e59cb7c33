use std::sync::Arc;

use crate::{
    config::{ApiKey, Config},
    error::AppResult,
    services::{
        CommonMovies, HttpPageFetcher, Letterboxd, MetadataProvider, PipelineSettings,
        TmdbProvider,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: CommonMovies,
    pub metadata_provider: Arc<dyn MetadataProvider>,
    /// Process-level TMDB key, used when a request brings none
    pub fallback_api_key: Option<String>,
}

impl AppState {
    pub fn new(
        pipeline: CommonMovies,
        metadata_provider: Arc<dyn MetadataProvider>,
        fallback_api_key: Option<String>,
    ) -> Self {
        Self {
            pipeline,
            metadata_provider,
            fallback_api_key,
        }
    }

    /// Wires the real Letterboxd scraper and TMDB client from configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let pacing = config.pacing();

        let fetcher = Arc::new(HttpPageFetcher::new(&config.user_agent, config.http_timeout())?);
        let letterboxd = Letterboxd::new(fetcher, config.letterboxd_url.clone(), pacing.page_delay);

        let provider: Arc<dyn MetadataProvider> =
            Arc::new(TmdbProvider::new(config.tmdb_api_url.clone(), config.http_timeout())?);

        let settings = PipelineSettings {
            pacing,
            image_base_url: config.tmdb_image_url.clone(),
            max_concurrent_fetches: config.max_concurrent_fetches,
            deadline: config.request_deadline(),
        };

        Ok(Self::new(
            CommonMovies::new(letterboxd, provider.clone(), settings),
            provider,
            config.tmdb_api_key.clone(),
        ))
    }

    /// Whether the process-level key is usable on its own
    pub fn api_key_configured(config: &Config) -> bool {
        ApiKey::select(None, config.tmdb_api_key.as_deref()).is_some()
    }

    /// The key to use for one request; `None` means metadata is skipped
    pub fn api_key(&self, request_key: Option<&str>) -> Option<ApiKey> {
        ApiKey::select(request_key, self.fallback_api_key.as_deref())
    }
}
