use serde::{Deserialize, Serialize};

/// A validated, public Letterboxd profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub avatar_url: String,
}

/// One film on a user's watchlist, exactly as the site displays it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    /// Displayed title, not normalized (e.g. "Dune (2021)")
    pub title: String,
    /// Absolute URL of the film page
    pub detail_url: String,
}

/// A title merged across watchlists, with the users that listed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedTitle {
    pub title: String,
    /// Usernames in arrival order; never contains duplicates
    pub contributors: Vec<String>,
    /// Link from the first watchlist that listed the title
    pub detail_url: String,
}

impl AggregatedTitle {
    pub fn new(title: String, first_contributor: String, detail_url: String) -> Self {
        Self {
            title,
            contributors: vec![first_contributor],
            detail_url,
        }
    }

    /// Number of distinct users that listed this title
    pub fn count(&self) -> usize {
        self.contributors.len()
    }

    /// Adds a contributor. Returns false if the user was already counted.
    pub fn add_contributor(&mut self, username: &str) -> bool {
        if self.contributors.iter().any(|c| c == username) {
            return false;
        }
        self.contributors.push(username.to_string());
        true
    }
}
