use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use curator_api::{
    api::{create_router, AppState},
    config::Config,
    db::{load_catalog, JsonFileStore},
    services::Recommender,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let catalog = load_catalog(&config.users_path(), &config.products_path())
        .context("Failed to load catalog")?;
    let store = Arc::new(JsonFileStore::new(config.interactions_path()));
    let recommender = Recommender::load(catalog, store)
        .await
        .context("Failed to load interactions")?;

    let state = AppState::new(recommender, config.default_top_n);
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
