//! Import the candidates file into the configured vector index.
//!
//! Usage: `import-candidates [CANDIDATES_JSON]`

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use talent_scout::candidates::CandidateStore;
use talent_scout::config::Config;
use talent_scout::import::run_import;
use talent_scout::index;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_env();
    if let Some(path) = std::env::args().nth(1) {
        config.candidates_path = PathBuf::from(path);
    }
    config.validate()?;

    let store = CandidateStore::load(&config.candidates_path)?;

    let client = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(10))
        .timeout(std::time::Duration::from_secs(120))
        .build()?;
    let index = index::open(&config, client.clone())?;

    let report = run_import(
        &client,
        &config.llm,
        index.as_ref(),
        store.as_slice(),
        &config.import,
        |p| tracing::debug!("{}/{} processed", p.processed, p.total),
    )
    .await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
