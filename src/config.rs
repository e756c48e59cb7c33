use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Shortest key the metadata provider could plausibly accept
const MIN_API_KEY_LEN: usize = 10;

const MIN_PAGE_DELAY_MS: u64 = 500;
const MIN_SEARCH_DELAY_MS: u64 = 250;
const MIN_RATE_LIMIT_BACKOFF_MS: u64 = 2_000;
const MIN_DETAIL_RETRY_DELAY_MS: u64 = 500;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Fallback TMDB API key, used when a request does not carry its own
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDB image CDN base URL
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Letterboxd site root
    #[serde(default = "default_letterboxd_url")]
    pub letterboxd_url: String,

    /// User-Agent sent to Letterboxd; must look like a real browser
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Pause between consecutive watchlist pages
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Pause between consecutive title-variant searches
    #[serde(default = "default_search_delay_ms")]
    pub search_delay_ms: u64,

    /// Wait after a rate-limit response before the single retry
    #[serde(default = "default_rate_limit_backoff_ms")]
    pub rate_limit_backoff_ms: u64,

    /// Wait before retrying a failed details request
    #[serde(default = "default_detail_retry_delay_ms")]
    pub detail_retry_delay_ms: u64,

    /// Per-call timeout for every outbound HTTP request
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Overall deadline for one common-movies request
    #[serde(default = "default_request_deadline_secs")]
    pub request_deadline_secs: u64,

    /// Upper bound on watchlists scraped at the same time
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_letterboxd_url() -> String {
    "https://letterboxd.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string()
}

fn default_page_delay_ms() -> u64 {
    MIN_PAGE_DELAY_MS
}

fn default_search_delay_ms() -> u64 {
    MIN_SEARCH_DELAY_MS
}

fn default_rate_limit_backoff_ms() -> u64 {
    MIN_RATE_LIMIT_BACKOFF_MS
}

fn default_detail_retry_delay_ms() -> u64 {
    MIN_DETAIL_RETRY_DELAY_MS
}

fn default_http_timeout_secs() -> u64 {
    20
}

fn default_request_deadline_secs() -> u64 {
    600
}

fn default_max_concurrent_fetches() -> usize {
    8
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Delays used by the pipeline, never below the courtesy minimums
    pub fn pacing(&self) -> Pacing {
        Pacing {
            page_delay: Duration::from_millis(self.page_delay_ms.max(MIN_PAGE_DELAY_MS)),
            search_delay: Duration::from_millis(self.search_delay_ms.max(MIN_SEARCH_DELAY_MS)),
            rate_limit_backoff: Duration::from_millis(
                self.rate_limit_backoff_ms.max(MIN_RATE_LIMIT_BACKOFF_MS),
            ),
            detail_retry_delay: Duration::from_millis(
                self.detail_retry_delay_ms.max(MIN_DETAIL_RETRY_DELAY_MS),
            ),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs.max(1))
    }
}

/// Waits applied between outbound requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub page_delay: Duration,
    pub search_delay: Duration,
    pub rate_limit_backoff: Duration,
    pub detail_retry_delay: Duration,
}

impl Pacing {
    /// No waits at all. Only meant for tests against fake collaborators.
    pub fn immediate() -> Self {
        Self {
            page_delay: Duration::ZERO,
            search_delay: Duration::ZERO,
            rate_limit_backoff: Duration::ZERO,
            detail_retry_delay: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(MIN_PAGE_DELAY_MS),
            search_delay: Duration::from_millis(MIN_SEARCH_DELAY_MS),
            rate_limit_backoff: Duration::from_millis(MIN_RATE_LIMIT_BACKOFF_MS),
            detail_retry_delay: Duration::from_millis(MIN_DETAIL_RETRY_DELAY_MS),
        }
    }
}

/// A TMDB API key that passed the length check
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` when the key is too short to be configured
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim();
        if key.chars().count() < MIN_API_KEY_LEN {
            return None;
        }
        Some(Self(key.to_string()))
    }

    /// Picks the request-supplied key when it is non-blank, else the process fallback
    pub fn select(request_key: Option<&str>, fallback: Option<&str>) -> Option<Self> {
        let chosen = request_key
            .filter(|k| !k.trim().is_empty())
            .or(fallback)?;
        Self::parse(chosen)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}
