use parking_lot::RwLock;
use std::sync::Arc;

use crate::candidates::CandidateStore;
use crate::config::Config;
use crate::index::{self, VectorIndex};
use crate::models::{ImportJob, ImportStatus};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub candidates: Arc<RwLock<CandidateStore>>,
    pub index: Arc<dyn VectorIndex>,
    pub http_client: reqwest::Client,
    pub import_jobs: Arc<RwLock<Vec<ImportJob>>>,
    pub import_semaphore: Arc<tokio::sync::Semaphore>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        let index = index::open(&config, http_client.clone())?;
        Self::with_index(config, http_client, index)
    }

    /// Build state around an already constructed index.
    pub fn with_index(
        config: Config,
        http_client: reqwest::Client,
        index: Arc<dyn VectorIndex>,
    ) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        // The server starts without candidates; an import reloads the file.
        let candidates = match CandidateStore::load(&config.candidates_path) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("Starting with no candidates: {e:#}");
                CandidateStore::default()
            }
        };

        let (jobs, interrupted) = load_jobs(&config);

        let state = Self {
            config,
            candidates: Arc::new(RwLock::new(candidates)),
            index,
            http_client,
            import_jobs: Arc::new(RwLock::new(jobs)),
            import_semaphore: Arc::new(tokio::sync::Semaphore::new(1)),
        };
        if interrupted > 0 {
            tracing::warn!("Marked {interrupted} interrupted import job(s) as failed");
            state.persist_jobs();
        }
        Ok(state)
    }

    /// Persist import job history to disk (atomic write via temp file + rename).
    /// The lock is released before touching the filesystem.
    pub fn persist_jobs(&self) {
        let serialized = serde_json::to_string_pretty(&*self.import_jobs.read());
        match serialized {
            Ok(data) => {
                let path = self.config.jobs_path();
                let tmp_path = path.with_extension("json.tmp");
                if let Err(e) = std::fs::write(&tmp_path, &data)
                    .and_then(|_| std::fs::rename(&tmp_path, &path))
                {
                    tracing::warn!("Failed to persist import jobs: {e}");
                }
            }
            Err(e) => tracing::warn!("Failed to serialize import jobs: {e}"),
        }
    }
}

/// Load job history. Jobs still marked running belonged to a process that
/// exited mid-import; returns how many of those were marked failed.
fn load_jobs(config: &Config) -> (Vec<ImportJob>, usize) {
    let path = config.jobs_path();
    if !path.exists() {
        return (Vec::new(), 0);
    }

    let mut jobs: Vec<ImportJob> = match std::fs::read_to_string(&path)
        .map_err(anyhow::Error::from)
        .and_then(|data| serde_json::from_str::<Vec<ImportJob>>(&data).map_err(anyhow::Error::from))
    {
        Ok(jobs) => jobs,
        Err(e) => {
            tracing::warn!("Ignoring unreadable import history {}: {e}", path.display());
            return (Vec::new(), 0);
        }
    };

    let mut interrupted = 0;
    for job in jobs.iter_mut().filter(|j| j.status == ImportStatus::Running) {
        job.status = ImportStatus::Failed("interrupted".to_string());
        interrupted += 1;
    }
    (jobs, interrupted)
}
