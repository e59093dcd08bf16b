use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use lumiere_api::api::{create_router, AppState};
use lumiere_api::config::Config;
use lumiere_api::services::{CatalogProvider, TmdbCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lumiere_api=info,tower_http=info")),
        )
        .init();

    let catalog = Arc::new(TmdbCatalog::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_locale.clone(),
    )?);

    // Startup self-check: a rejected key means every catalog request will fail,
    // but a transient outage should not keep the server from starting.
    if let Err(error) = catalog.validate_credential().await {
        tracing::warn!(error = %error, "TMDB credential check failed");
    } else {
        tracing::info!("TMDB credential accepted");
    }

    let state = AppState::new(catalog);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
