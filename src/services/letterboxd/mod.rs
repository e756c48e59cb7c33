/// Letterboxd scraping
///
/// Letterboxd has no public API, so profiles and watchlists are read from the
/// public HTML pages. Fetching is behind the `PageFetcher` trait so the
/// profile validator and watchlist fetcher can run against canned pages in tests.
use crate::error::AppResult;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;

pub mod parser;
pub mod profile;
pub mod watchlist;

/// Failure to retrieve a single page
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("page returned status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Retrieves raw HTML for an absolute URL
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

/// `PageFetcher` backed by reqwest, with browser-like headers
#[derive(Clone)]
pub struct HttpPageFetcher {
    http_client: HttpClient,
}

impl HttpPageFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let http_client = HttpClient::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http_client })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = %status, "Letterboxd page request failed");
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}

/// Entry point for everything read from Letterboxd
#[derive(Clone)]
pub struct Letterboxd {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
    page_delay: Duration,
}

impl Letterboxd {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>, page_delay: Duration) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            page_delay,
        }
    }

    /// URL of a page under a user's area, e.g. `/{username}/watchlist/`.
    ///
    /// The username is one percent-encoded path segment, so a value such as
    /// `film/dune-2021` cannot address another part of the site.
    fn user_url(&self, username: &str, rest: &[&str]) -> String {
        if let Ok(mut url) = reqwest::Url::parse(&self.base_url) {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(username).extend(rest).push("");
            }
            return url.to_string();
        }

        let mut path = format!("/{}/", username);
        for part in rest {
            path.push_str(part);
            path.push('/');
        }
        self.absolute_url(&path)
    }

    /// Joins a site-relative path (e.g. `/film/dune-2021/`) onto the site root
    fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}
