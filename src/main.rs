use anyhow::Context;
use tracing_subscriber::EnvFilter;

use estate_api::api::{create_router, AppState};
use estate_api::artifacts::Artifacts;
use estate_api::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(data_dir = %config.data_dir.display(), "Loading artifacts");

    // Everything is read once here; handlers only ever see the loaded copy
    let artifacts = Artifacts::load(&config).context("Failed to load artifacts")?;

    let state = AppState::new(
        artifacts,
        config.default_recommendation_count,
        config.default_word_limit,
    );
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app).await?;
    Ok(())
}
