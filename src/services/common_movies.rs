/// The common-watchlist pipeline
///
/// 1. Validate every profile (sequential, fail fast)
/// 2. Scrape every watchlist (parallel, bounded, first error wins)
/// 3. Intersect by title
/// 4. Resolve metadata per shared title (sequential, paced)
/// 5. Build and rank the results
use crate::{
    config::{ApiKey, Pacing},
    error::{AppError, AppResult},
    models::{ResultMovie, WatchlistEntry},
    services::{
        intersection::common_titles,
        letterboxd::Letterboxd,
        metadata::MetadataResolver,
        providers::MetadataProvider,
        ranking::{avatar_index, build_movie, rank},
    },
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Knobs for one pipeline instance
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub pacing: Pacing,
    pub image_base_url: String,
    pub max_concurrent_fetches: usize,
    pub deadline: Duration,
}

#[derive(Clone)]
pub struct CommonMovies {
    letterboxd: Letterboxd,
    provider: Arc<dyn MetadataProvider>,
    settings: PipelineSettings,
}

/// Trims names, drops repeats and rejects empty input
fn normalize_usernames(usernames: &[String]) -> AppResult<Vec<String>> {
    if usernames.is_empty() {
        return Err(AppError::InvalidInput("No usernames provided".to_string()));
    }

    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(usernames.len());
    for raw in usernames {
        let username = raw.trim();
        if username.is_empty() {
            return Err(AppError::InvalidInput("Usernames cannot be empty".to_string()));
        }
        if seen.insert(username.to_string()) {
            normalized.push(username.to_string());
        } else {
            tracing::debug!(username = %username, "Ignoring repeated username");
        }
    }

    Ok(normalized)
}

impl CommonMovies {
    pub fn new(letterboxd: Letterboxd, provider: Arc<dyn MetadataProvider>, settings: PipelineSettings) -> Self {
        Self {
            letterboxd,
            provider,
            settings,
        }
    }

    /// Finds the movies on two or more of the given users' watchlists.
    ///
    /// Fails if any profile or watchlist cannot be read, naming the user.
    /// Without a usable `key` every movie carries placeholder metadata.
    /// An empty result means nothing was shared.
    pub async fn resolve(&self, usernames: &[String], key: Option<ApiKey>) -> AppResult<Vec<ResultMovie>> {
        let usernames = normalize_usernames(usernames)?;
        let deadline = self.settings.deadline;

        // Dropping the pipeline on expiry aborts any in-flight scraping tasks
        tokio::time::timeout(deadline, self.run(usernames, key))
            .await
            .map_err(|_| {
                tracing::warn!(deadline_secs = deadline.as_secs(), "Common movies request hit its deadline");
                AppError::Timeout(format!("no result within {} seconds", deadline.as_secs()))
            })?
    }

    async fn run(&self, usernames: Vec<String>, key: Option<ApiKey>) -> AppResult<Vec<ResultMovie>> {
        let mut profiles = Vec::with_capacity(usernames.len());
        for username in &usernames {
            profiles.push(self.letterboxd.validate_profile(username).await?);
        }
        let avatars = avatar_index(&profiles);

        let watchlists = self.fetch_watchlists(&usernames).await?;
        let shared = common_titles(&watchlists);

        tracing::info!(
            users = usernames.len(),
            shared_titles = shared.len(),
            "Watchlists intersected"
        );

        let resolver = key.map(|key| {
            MetadataResolver::new(
                self.provider.clone(),
                key,
                self.settings.pacing,
                self.settings.image_base_url.clone(),
            )
        });
        if resolver.is_none() && !shared.is_empty() {
            tracing::warn!("TMDB API key not configured, using placeholder metadata");
        }

        let mut movies = Vec::with_capacity(shared.len());
        for title in shared {
            let metadata = match &resolver {
                Some(resolver) => match resolver.resolve(&title.title).await {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::info!(title = %title.title, error = %e, "Using placeholder metadata");
                        None
                    }
                },
                None => None,
            };
            movies.push(build_movie(title, &avatars, metadata));
        }

        rank(&mut movies);
        Ok(movies)
    }

    /// Scrapes all watchlists concurrently and returns them in input order.
    ///
    /// The first failure is returned immediately; dropping the `JoinSet`
    /// aborts the fetches still running.
    async fn fetch_watchlists(&self, usernames: &[String]) -> AppResult<Vec<(String, Vec<WatchlistEntry>)>> {
        let permits = Arc::new(Semaphore::new(self.settings.max_concurrent_fetches.max(1)));
        let mut tasks = JoinSet::new();

        for (position, username) in usernames.iter().enumerate() {
            let letterboxd = self.letterboxd.clone();
            let permits = permits.clone();
            let username = username.clone();

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| AppError::Internal(e.to_string()))?;
                let entries = letterboxd.fetch_watchlist(&username).await?;
                Ok::<_, AppError>((position, username, entries))
            });
        }

        let mut watchlists: Vec<Option<(String, Vec<WatchlistEntry>)>> =
            (0..usernames.len()).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            let (position, username, entries) = joined
                .map_err(|e| AppError::Internal(format!("Watchlist task failed: {}", e)))??;
            watchlists[position] = Some((username, entries));
        }

        Ok(watchlists.into_iter().flatten().collect())
    }
}
