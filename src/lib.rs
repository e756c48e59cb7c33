//! Finds the movies that appear on two or more public Letterboxd watchlists
//! and enriches them with TMDB metadata.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
