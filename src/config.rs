use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where import job history and the local vector index are stored
    pub data_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// JSON file holding the candidate records
    pub candidates_path: PathBuf,
    /// Embeddings/completions provider configuration
    pub llm: LlmConfig,
    /// Vector index configuration
    pub index: IndexConfig,
    /// Batch importer settings
    pub import: ImportConfig,
    /// Query-time retrieval and team settings
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai" or "ollama"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for team selection
    pub chat_model: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Embedding vector dimension
    pub embedding_dim: usize,
}

/// Which vector index implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexBackend {
    /// Hosted Pinecone-compatible index reached over HTTPS.
    Pinecone,
    /// In-process cosine index persisted under the data directory.
    Local,
}

impl IndexBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexBackend::Pinecone => "pinecone",
            IndexBackend::Local => "local",
        }
    }
}

impl std::str::FromStr for IndexBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pinecone" => Ok(IndexBackend::Pinecone),
            "local" => Ok(IndexBackend::Local),
            other => anyhow::bail!("Unknown vector index backend: {other}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub backend: IndexBackend,
    /// Index host, e.g. "https://candidates-abc123.svc.us-east-1.pinecone.io"
    pub host: Option<String>,
    pub api_key: Option<String>,
    /// Namespace the candidate vectors live in
    pub namespace: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Candidates embedded and upserted per batch
    pub batch_size: usize,
    /// Fixed pause between batches, in milliseconds
    pub batch_delay_ms: u64,
}

impl ImportConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Candidates retrieved from the index before team selection
    pub pool_size: usize,
    /// Upper bound for any caller-supplied top_k / pool_size
    pub max_top_k: usize,
    /// Number of people the LLM is asked to pick
    pub team_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:9000".to_string(),
            candidates_path: PathBuf::from("./data/candidates.json"),
            llm: LlmConfig::default(),
            index: IndexConfig::default(),
            import: ImportConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: "https://api.openai.com".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            api_key: None,
            embedding_dim: 1536,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Pinecone,
            host: None,
            api_key: None,
            namespace: "candidates".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            batch_delay_ms: 1_000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pool_size: 20,
            max_top_k: 100,
            team_size: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("TALENT_SCOUT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("TALENT_SCOUT_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(path) = std::env::var("TALENT_SCOUT_CANDIDATES") {
            config.candidates_path = PathBuf::from(path);
        }

        // LLM provider
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(model) = std::env::var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(dim) = std::env::var("LLM_EMBEDDING_DIM") {
            if let Ok(d) = dim.parse() {
                config.llm.embedding_dim = d;
            }
        }

        // Vector index
        if let Ok(backend) = std::env::var("VECTOR_INDEX_BACKEND") {
            match backend.parse() {
                Ok(b) => config.index.backend = b,
                Err(e) => tracing::warn!("Ignoring VECTOR_INDEX_BACKEND: {e}"),
            }
        }
        if let Ok(host) = std::env::var("VECTOR_INDEX_HOST") {
            config.index.host = Some(host);
        }
        if let Ok(key) = std::env::var("VECTOR_INDEX_API_KEY") {
            config.index.api_key = Some(key);
        }
        if let Ok(ns) = std::env::var("VECTOR_INDEX_NAMESPACE") {
            config.index.namespace = ns;
        }
        if let Ok(val) = std::env::var("VECTOR_INDEX_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.index.timeout_secs = v;
            }
        }

        // Importer
        if let Ok(val) = std::env::var("IMPORT_BATCH_SIZE") {
            if let Ok(v) = val.parse() {
                config.import.batch_size = v;
            }
        }
        if let Ok(val) = std::env::var("IMPORT_BATCH_DELAY_MS") {
            if let Ok(v) = val.parse() {
                config.import.batch_delay_ms = v;
            }
        }

        // Search
        if let Ok(val) = std::env::var("SEARCH_POOL_SIZE") {
            if let Ok(v) = val.parse() {
                config.search.pool_size = v;
            }
        }
        if let Ok(val) = std::env::var("SEARCH_MAX_TOP_K") {
            if let Ok(v) = val.parse() {
                config.search.max_top_k = v;
            }
        }
        if let Ok(val) = std::env::var("TEAM_SIZE") {
            if let Ok(v) = val.parse() {
                config.search.team_size = v;
            }
        }

        config
    }

    /// Reject configurations that cannot reach their services.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.llm.provider.as_str() {
            "openai" | "ollama" => {}
            other => anyhow::bail!("Unknown LLM provider: {other}"),
        }
        if self.llm.embedding_dim == 0 {
            anyhow::bail!("LLM_EMBEDDING_DIM must be greater than zero");
        }
        if self.index.backend == IndexBackend::Pinecone {
            if self.index.host.as_deref().map_or(true, |h| h.trim().is_empty()) {
                anyhow::bail!("VECTOR_INDEX_HOST is required for the pinecone backend");
            }
            if self.index.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
                anyhow::bail!("VECTOR_INDEX_API_KEY is required for the pinecone backend");
            }
        }
        if self.search.team_size == 0 {
            anyhow::bail!("TEAM_SIZE must be greater than zero");
        }
        if self.search.max_top_k == 0 {
            anyhow::bail!("SEARCH_MAX_TOP_K must be greater than zero");
        }
        Ok(())
    }

    /// Clamp a caller-supplied result count into `1..=max_top_k`.
    pub fn clamp_top_k(&self, requested: Option<usize>, default: usize) -> usize {
        requested
            .unwrap_or(default)
            .clamp(1, self.search.max_top_k.max(1))
    }

    pub fn vector_dir(&self) -> PathBuf {
        self.data_dir.join("vectors")
    }

    pub fn jobs_path(&self) -> PathBuf {
        self.data_dir.join("imports.json")
    }
}
