/// Metadata resolution for watchlist titles
///
/// Watchlist titles are free text ("Amélie (2001)"), so a match is searched
/// for with a few progressively looser spellings. The first spelling that
/// returns any candidate wins; its top result is then fetched in full.
use crate::{
    config::{ApiKey, Pacing},
    error::{AppError, AppResult},
    models::{
        movie::{NOT_AVAILABLE, NO_OVERVIEW, PLACEHOLDER_POSTER_URL, UNKNOWN_RELEASE_DATE, UNKNOWN_RELEASE_YEAR},
        MetadataRecord, Person, TmdbImage, TmdbMovie,
    },
    services::{
        providers::{MetadataProvider, ProviderError},
        title_variants::{build_query, TitleQuery},
    },
};
use std::sync::Arc;

const MAX_CAST: usize = 5;

#[derive(Clone)]
pub struct MetadataResolver {
    provider: Arc<dyn MetadataProvider>,
    key: ApiKey,
    pacing: Pacing,
    image_base_url: String,
}

impl MetadataResolver {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        key: ApiKey,
        pacing: Pacing,
        image_base_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            key,
            pacing,
            image_base_url: image_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolves a displayed watchlist title to a full metadata record.
    ///
    /// Fails with `MetadataNotFound` when no spelling matches and with
    /// `MetadataTransport` when the details cannot be fetched. Both are
    /// expected outcomes for the caller, not reasons to abort a batch.
    pub async fn resolve(&self, title: &str) -> AppResult<MetadataRecord> {
        let query = build_query(title);
        let id = self.find_id(title, &query).await?;
        let movie = self.fetch_details(title, id).await?;
        Ok(build_record(movie, &self.image_base_url))
    }

    async fn find_id(&self, title: &str, query: &TitleQuery) -> AppResult<u64> {
        let mut last_error: Option<ProviderError> = None;

        for (attempt, variant) in query.variants.iter().enumerate() {
            if attempt > 0 {
                tokio::time::sleep(self.pacing.search_delay).await;
            }

            tracing::debug!(
                title = %title,
                variant = %variant,
                year = ?query.year,
                attempt = attempt + 1,
                provider = self.provider.name(),
                "Searching metadata"
            );

            match self.search_variant(variant, query.year).await {
                Ok(ids) => {
                    if let Some(&id) = ids.first() {
                        tracing::info!(title = %title, tmdb_id = id, attempt = attempt + 1, "Metadata match found");
                        return Ok(id);
                    }
                }
                Err(e) => {
                    tracing::debug!(title = %title, variant = %variant, error = %e, "Metadata search failed");
                    last_error = Some(e);
                }
            }
        }

        tracing::info!(
            title = %title,
            attempts = query.variants.len(),
            last_error = ?last_error,
            "No metadata match"
        );

        Err(AppError::MetadataNotFound(title.to_string()))
    }

    /// One search, retried once after a backoff if the provider rate limits us
    async fn search_variant(&self, variant: &str, year: Option<u16>) -> Result<Vec<u64>, ProviderError> {
        match self.provider.search_movie(&self.key, variant, year).await {
            Err(ProviderError::RateLimited) => {
                tracing::warn!(
                    variant = %variant,
                    backoff_ms = self.pacing.rate_limit_backoff.as_millis() as u64,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(self.pacing.rate_limit_backoff).await;
                self.provider.search_movie(&self.key, variant, year).await
            }
            other => other,
        }
    }

    async fn fetch_details(&self, title: &str, id: u64) -> AppResult<TmdbMovie> {
        let first = match self.provider.movie_details(&self.key, id).await {
            Ok(movie) => return Ok(movie),
            Err(e) => e,
        };

        if !first.is_retryable() {
            return Err(AppError::MetadataTransport(format!(
                "failed to parse details for '{}': {}",
                title, first
            )));
        }

        tracing::debug!(title = %title, tmdb_id = id, error = %first, "Details request failed, retrying");
        tokio::time::sleep(self.pacing.detail_retry_delay).await;

        self.provider
            .movie_details(&self.key, id)
            .await
            .map_err(|e| AppError::MetadataTransport(format!("failed to get details for '{}': {}", title, e)))
    }
}

/// Prefers an English logo, then a language-neutral one
fn pick_logo(logos: &[TmdbImage]) -> Option<&str> {
    let english = logos
        .iter()
        .find(|logo| logo.iso_639_1.as_deref() == Some("en"));
    let neutral = || {
        logos
            .iter()
            .find(|logo| matches!(logo.iso_639_1.as_deref(), None | Some("xx")))
    };

    english
        .or_else(neutral)
        .map(|logo| logo.file_path.as_str())
        .filter(|path| !path.is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Turns a provider details payload into the record returned to callers
pub fn build_record(movie: TmdbMovie, image_base_url: &str) -> MetadataRecord {
    let rating = movie.vote_average.unwrap_or(0.0);
    let formatted_rating = if rating > 0.0 {
        format!("{:.1}", rating)
    } else {
        NOT_AVAILABLE.to_string()
    };

    let poster_url = non_empty(movie.poster_path)
        .map(|path| format!("{}/w500{}", image_base_url, path))
        .unwrap_or_else(|| PLACEHOLDER_POSTER_URL.to_string());
    let backdrop_url = non_empty(movie.backdrop_path)
        .map(|path| format!("{}/original{}", image_base_url, path))
        .unwrap_or_else(|| poster_url.clone());
    let logo_url = pick_logo(&movie.images.logos)
        .map(|path| format!("{}/original{}", image_base_url, path));

    let release_date = non_empty(movie.release_date);
    let release_year = release_date
        .as_deref()
        .and_then(|date| date.split('-').next())
        .filter(|year| !year.is_empty())
        .unwrap_or(UNKNOWN_RELEASE_YEAR)
        .to_string();

    let runtime = movie.runtime.unwrap_or(0);
    let formatted_runtime = (runtime > 0).then(|| format!("{} min", runtime));

    let director = movie
        .credits
        .crew
        .iter()
        .find(|member| member.job == "Director")
        .map(|member| Person::new(member.name.clone(), member.id))
        .unwrap_or_else(Person::unknown);

    let cast = movie
        .credits
        .cast
        .iter()
        .take(MAX_CAST)
        .map(|member| Person::new(member.name.clone(), member.id))
        .collect();

    MetadataRecord {
        tmdb_id: Some(movie.id),
        rating,
        formatted_rating,
        poster_url,
        backdrop_url,
        logo_url,
        release_date: release_date.unwrap_or_else(|| UNKNOWN_RELEASE_DATE.to_string()),
        release_year,
        runtime,
        formatted_runtime,
        genres: movie.genres.into_iter().map(|genre| genre.name).collect(),
        imdb_id: non_empty(movie.imdb_id),
        overview: non_empty(movie.overview).unwrap_or_else(|| NO_OVERVIEW.to_string()),
        director,
        cast,
    }
}
