use serde::{Deserialize, Serialize};

/// Shared artwork used whenever the provider has no poster
pub const PLACEHOLDER_POSTER_URL: &str =
    "https://placehold.co/500x750/1f1f1f/ffffff?text=No+Poster";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_OVERVIEW: &str = "No overview available.";
pub const UNKNOWN_RELEASE_DATE: &str = "0000-00-00";
pub const UNKNOWN_RELEASE_YEAR: &str = "----";
pub const UNKNOWN_PERSON: &str = "Unknown";

/// A director or cast member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    /// Provider person id; `None` only for the unknown sentinel
    pub id: Option<u64>,
}

impl Person {
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id: Some(id),
        }
    }

    /// Sentinel for a film with no known director
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_PERSON.to_string(),
            id: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.id.is_none()
    }
}

/// A contributor as shown next to a movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub avatar: String,
}

/// Everything the metadata provider tells us about one film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub tmdb_id: Option<u64>,
    pub rating: f64,
    pub formatted_rating: String,
    pub poster_url: String,
    pub backdrop_url: String,
    pub logo_url: Option<String>,
    pub release_date: String,
    pub release_year: String,
    pub runtime: u32,
    pub formatted_runtime: Option<String>,
    pub genres: Vec<String>,
    pub imdb_id: Option<String>,
    pub overview: String,
    pub director: Person,
    pub cast: Vec<Person>,
}

impl MetadataRecord {
    /// Deterministic stand-in used when resolution fails or is skipped
    pub fn placeholder() -> Self {
        Self {
            tmdb_id: None,
            rating: 0.0,
            formatted_rating: NOT_AVAILABLE.to_string(),
            poster_url: PLACEHOLDER_POSTER_URL.to_string(),
            backdrop_url: PLACEHOLDER_POSTER_URL.to_string(),
            logo_url: None,
            release_date: UNKNOWN_RELEASE_DATE.to_string(),
            release_year: UNKNOWN_RELEASE_YEAR.to_string(),
            runtime: 0,
            formatted_runtime: None,
            genres: Vec::new(),
            imdb_id: None,
            overview: NO_OVERVIEW.to_string(),
            director: Person::unknown(),
            cast: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.tmdb_id.is_none()
    }
}

/// A movie found on two or more watchlists, ready to return to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMovie {
    pub title: String,
    pub url: String,
    pub count: usize,
    pub users: Vec<User>,
    #[serde(flatten)]
    pub metadata: MetadataRecord,
}

impl ResultMovie {
    pub fn rating(&self) -> f64 {
        self.metadata.rating
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_values() {
        let record = MetadataRecord::placeholder();
        assert!(record.is_placeholder());
        assert_eq!(record.formatted_rating, "N/A");
        assert_eq!(record.backdrop_url, record.poster_url);
        assert!(record.genres.is_empty());
        assert!(record.cast.is_empty());
        assert!(record.director.is_unknown());
        assert_eq!(record.overview, "No overview available.");
    }

    #[test]
    fn test_result_movie_serializes_flat() {
        let movie = ResultMovie {
            title: "Arrival (2016)".to_string(),
            url: "https://letterboxd.com/film/arrival-2016/".to_string(),
            count: 2,
            users: vec![User {
                name: "alice".to_string(),
                avatar: "https://a.ltrbxd.com/alice.jpg".to_string(),
            }],
            metadata: MetadataRecord::placeholder(),
        };

        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["title"], "Arrival (2016)");
        assert_eq!(json["count"], 2);
        assert_eq!(json["formatted_rating"], "N/A");
        assert_eq!(json["director"]["name"], "Unknown");
        assert!(json["director"]["id"].is_null());
        assert_eq!(json["users"][0]["name"], "alice");
    }
}
