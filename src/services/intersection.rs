use crate::models::{AggregatedTitle, WatchlistEntry};
use std::collections::HashMap;

/// Fewest watchlists a title must appear on to be reported
pub const MIN_CONTRIBUTORS: usize = 2;

/// Merges per-user watchlists into titles shared by at least two users.
///
/// Titles match on exact string equality. Output keeps first-seen order:
/// users in the order given, entries in watchlist order. The detail link of
/// the first user to list a title is kept.
pub fn common_titles(watchlists: &[(String, Vec<WatchlistEntry>)]) -> Vec<AggregatedTitle> {
    let mut aggregated: Vec<AggregatedTitle> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (username, entries) in watchlists {
        for entry in entries {
            match index.get(entry.title.as_str()) {
                Some(&position) => {
                    aggregated[position].add_contributor(username);
                }
                None => {
                    index.insert(entry.title.as_str(), aggregated.len());
                    aggregated.push(AggregatedTitle::new(
                        entry.title.clone(),
                        username.clone(),
                        entry.detail_url.clone(),
                    ));
                }
            }
        }
    }

    aggregated.retain(|title| title.count() >= MIN_CONTRIBUTORS);
    aggregated
}
