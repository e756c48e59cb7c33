use super::{parser, Letterboxd};
use crate::{
    error::{AppError, AppResult},
    models::UserProfile,
};

impl Letterboxd {
    /// Confirms the user has a public profile and returns its avatar.
    ///
    /// Private, missing and malformed profiles all fail with `ProfileNotFound`.
    pub async fn validate_profile(&self, username: &str) -> AppResult<UserProfile> {
        let url = self.user_url(username, &[]);

        let html = self.fetcher.fetch_html(&url).await.map_err(|e| {
            tracing::warn!(username = %username, error = %e, "Could not fetch profile");
            AppError::ProfileNotFound(username.to_string())
        })?;

        let avatar_url = parser::profile_image(&html).ok_or_else(|| {
            tracing::warn!(username = %username, "Profile page has no avatar");
            AppError::ProfileNotFound(username.to_string())
        })?;

        tracing::debug!(username = %username, "Profile validated");

        Ok(UserProfile {
            username: username.to_string(),
            avatar_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::FakeSite;
    use super::super::{FetchError, MockPageFetcher};
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    const PROFILE_HTML: &str = r#"<html><head>
        <meta property="og:image" content="https://a.ltrbxd.com/avatar/alice.jpg" />
    </head></html>"#;

    fn letterboxd(site: FakeSite) -> Letterboxd {
        Letterboxd::new(Arc::new(site), "https://letterboxd.com", Duration::ZERO)
    }

    #[tokio::test]
    async fn test_validate_profile_success() {
        let site = FakeSite::default().with_page("https://letterboxd.com/alice/", PROFILE_HTML);

        let profile = letterboxd(site).validate_profile("alice").await.unwrap();
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.avatar_url, "https://a.ltrbxd.com/avatar/alice.jpg");
    }

    #[tokio::test]
    async fn test_validate_profile_missing_page() {
        let result = letterboxd(FakeSite::default()).validate_profile("ghost").await;
        assert!(matches!(result, Err(AppError::ProfileNotFound(name)) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_validate_profile_without_avatar() {
        let site = FakeSite::default()
            .with_page("https://letterboxd.com/private/", "<html><head></head></html>");

        let result = letterboxd(site).validate_profile("private").await;
        assert!(matches!(result, Err(AppError::ProfileNotFound(name)) if name == "private"));
    }

    #[tokio::test]
    async fn test_validate_profile_transport_error() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch_html()
            .times(1)
            .returning(|_| Err(FetchError::Transport("connection reset".to_string())));

        let letterboxd = Letterboxd::new(Arc::new(fetcher), "https://letterboxd.com", Duration::ZERO);
        let result = letterboxd.validate_profile("carol").await;
        assert!(matches!(result, Err(AppError::ProfileNotFound(name)) if name == "carol"));
    }

    #[tokio::test]
    async fn test_username_cannot_reach_other_pages() {
        let site = FakeSite::default().with_page("https://letterboxd.com/film/dune-2021/", PROFILE_HTML);

        let result = letterboxd(site).validate_profile("film/dune-2021").await;
        assert!(matches!(result, Err(AppError::ProfileNotFound(name)) if name == "film/dune-2021"));
    }
}
