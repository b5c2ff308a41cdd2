use tracing_subscriber::EnvFilter;

use talent_scout::api;
use talent_scout::config::Config;
use talent_scout::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    config.validate()?;
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("Candidates file: {}", config.candidates_path.display());
    tracing::info!("LLM provider: {} ({})", config.llm.provider, config.llm.base_url);
    tracing::info!("Vector index backend: {}", config.index.backend.as_str());

    let state = AppState::new(config.clone())?;

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
