use crate::models::{AggregatedTitle, MetadataRecord, ResultMovie, User, UserProfile};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Builds the record for one shared title.
///
/// `metadata` is `None` when resolution failed or was skipped; the movie is
/// still reported, with placeholder metadata.
pub fn build_movie(
    title: AggregatedTitle,
    avatars: &HashMap<String, String>,
    metadata: Option<MetadataRecord>,
) -> ResultMovie {
    let users = title
        .contributors
        .iter()
        .map(|name| User {
            name: name.clone(),
            avatar: avatars.get(name).cloned().unwrap_or_default(),
        })
        .collect();

    ResultMovie {
        count: title.count(),
        title: title.title,
        url: title.detail_url,
        users,
        metadata: metadata.unwrap_or_else(MetadataRecord::placeholder),
    }
}

/// Index of avatars by username
pub fn avatar_index(profiles: &[UserProfile]) -> HashMap<String, String> {
    profiles
        .iter()
        .map(|profile| (profile.username.clone(), profile.avatar_url.clone()))
        .collect()
}

fn by_count_then_rating(a: &ResultMovie, b: &ResultMovie) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| b.rating().total_cmp(&a.rating()))
}

/// Sorts by contributor count, then rating, both descending
pub fn rank(movies: &mut [ResultMovie]) {
    movies.sort_by(by_count_then_rating);
}
