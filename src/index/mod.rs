//! Vector index abstraction: a hosted index in production, an in-process
//! one for development and tests.

pub mod local;
pub mod pinecone;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{Config, IndexBackend};

pub use local::LocalIndex;
pub use pinecone::PineconeIndex;

/// A vector plus the metadata stored alongside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// An id returned by a similarity query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredId {
    pub id: String,
    pub score: f32,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace records by id. Returns how many were stored.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize>;

    /// Top-k most similar ids, best first.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredId>>;

    async fn delete(&self, ids: &[String]) -> Result<()>;

    /// Number of vectors currently stored.
    async fn count(&self) -> Result<usize>;
}

/// Build the index configured for this process.
pub fn open(config: &Config, client: reqwest::Client) -> Result<Arc<dyn VectorIndex>> {
    match config.index.backend {
        IndexBackend::Pinecone => {
            let index = PineconeIndex::new(client, &config.index)
                .context("Failed to configure hosted vector index")?;
            Ok(Arc::new(index))
        }
        IndexBackend::Local => {
            let index = LocalIndex::open_or_create(&config.vector_dir())?;
            Ok(Arc::new(index))
        }
    }
}
