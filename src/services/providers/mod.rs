/// Movie metadata provider abstraction
///
/// The resolver only needs two calls from a provider: a title search that
/// yields candidate ids, and a detail lookup by id. Retry and pacing policy
/// lives in the resolver, so providers report failures as-is and classify
/// rate limiting separately.
use crate::{config::ApiKey, models::TmdbMovie};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Failure of a single provider call
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("rate limited")]
    RateLimited,

    #[error("API error: status code {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Transport(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Whether a fresh attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProviderError::Parse(_))
    }
}

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search movies by title, optionally narrowed by release year.
    ///
    /// Returns candidate ids in the provider's relevance order.
    async fn search_movie(
        &self,
        key: &ApiKey,
        query: &str,
        year: Option<u16>,
    ) -> Result<Vec<u64>, ProviderError>;

    /// Fetch full details, including credits and images, for one id
    async fn movie_details(&self, key: &ApiKey, id: u64) -> Result<TmdbMovie, ProviderError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
