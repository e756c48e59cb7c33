use common_watchlist_api::{
    api::{create_router, AppState},
    config::Config,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("common_watchlist_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    if AppState::api_key_configured(&config) {
        tracing::info!("TMDB API key configured");
    } else {
        tracing::warn!("No usable TMDB_API_KEY; requests must bring their own key or get placeholder metadata");
    }

    // Initialize application state
    let state = AppState::from_config(&config)?;

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
