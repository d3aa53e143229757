use cinerank_api::api::{create_router, AppState};
use cinerank_api::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinerank_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Load catalog and model once; both are read-only afterwards
    let state = AppState::from_config(&config).await;
    tracing::info!(
        movies = state.catalog.len(),
        model_enabled = state.recommender.model_enabled(),
        "Application state ready"
    );

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
