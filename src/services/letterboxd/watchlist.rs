use super::{parser, Letterboxd};
use crate::{
    error::{AppError, AppResult},
    models::WatchlistEntry,
};
use std::collections::HashSet;

impl Letterboxd {
    /// Scrapes every page of a user's watchlist.
    ///
    /// Pages are followed through the "next" link one at a time, pausing
    /// `page_delay` before each follow-up request. Any page failure, or an
    /// empty result, fails the whole fetch with `WatchlistFetch`.
    pub async fn fetch_watchlist(&self, username: &str) -> AppResult<Vec<WatchlistEntry>> {
        let mut next_url = Some(self.user_url(username, &["watchlist"]));
        let mut visited = HashSet::new();
        let mut seen_titles = HashSet::new();
        let mut entries = Vec::new();
        let mut pages = 0usize;

        while let Some(url) = next_url.take() {
            if !visited.insert(url.clone()) {
                tracing::warn!(username = %username, url = %url, "Pagination loops back, stopping");
                break;
            }

            if pages > 0 {
                tokio::time::sleep(self.page_delay).await;
            }
            pages += 1;

            let html = self.fetcher.fetch_html(&url).await.map_err(|e| {
                tracing::warn!(username = %username, page = pages, error = %e, "Could not fetch watchlist page");
                AppError::WatchlistFetch(username.to_string())
            })?;

            let page = parser::watchlist_page(&html);
            for poster in page.entries {
                // A title counts once per user
                if seen_titles.insert(poster.title.clone()) {
                    entries.push(WatchlistEntry {
                        detail_url: self.absolute_url(&poster.link),
                        title: poster.title,
                    });
                }
            }

            next_url = page.next_href.map(|href| self.absolute_url(&href));
        }

        if entries.is_empty() {
            tracing::warn!(username = %username, pages, "Watchlist is empty");
            return Err(AppError::WatchlistFetch(username.to_string()));
        }

        tracing::info!(
            username = %username,
            pages,
            films = entries.len(),
            "Watchlist fetched"
        );

        Ok(entries)
    }
}
