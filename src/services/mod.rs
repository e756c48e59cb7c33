pub mod common_movies;
pub mod intersection;
pub mod letterboxd;
pub mod metadata;
pub mod providers;
pub mod ranking;
pub mod title_variants;

#[cfg(test)]
pub(crate) mod test_server;

pub use common_movies::{CommonMovies, PipelineSettings};
pub use letterboxd::{HttpPageFetcher, Letterboxd, PageFetcher};
pub use metadata::MetadataResolver;
pub use providers::{MetadataProvider, TmdbProvider};
