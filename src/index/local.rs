use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};

use super::{ScoredId, VectorIndex, VectorRecord};

/// In-memory vector index with disk persistence and cosine similarity search.
pub struct LocalIndex {
    entries: RwLock<Vec<VectorRecord>>,
    persist_path: PathBuf,
}

impl LocalIndex {
    pub fn open_or_create(vector_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(vector_dir)?;
        let persist_path = vector_dir.join("vectors.json");

        let entries = if persist_path.exists() {
            let data = std::fs::read_to_string(&persist_path)
                .context("Failed to read local vector index")?;
            serde_json::from_str(&data).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable local vector index: {e}");
                Vec::new()
            })
        } else {
            Vec::new()
        };

        Ok(Self {
            entries: RwLock::new(entries),
            persist_path,
        })
    }

    fn persist(&self, entries: &[VectorRecord]) -> Result<()> {
        let data = serde_json::to_string(entries)?;
        let tmp_path = self.persist_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, data)?;
        std::fs::rename(&tmp_path, &self.persist_path)?;
        Ok(())
    }

    fn search(&self, query: &[f32], top_k: usize) -> Vec<ScoredId> {
        let entries = self.entries.read();

        let mut scored: Vec<(f32, &VectorRecord)> = entries
            .iter()
            .map(|e| (cosine_similarity(query, &e.values), e))
            .collect();

        // Sort descending by score
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(score, e)| ScoredId {
                id: e.id.clone(),
                score,
            })
            .collect()
    }
}

#[async_trait]
impl VectorIndex for LocalIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut entries = self.entries.write();
        for record in records {
            match entries.iter_mut().find(|e| e.id == record.id) {
                Some(existing) => *existing = record.clone(),
                None => entries.push(record.clone()),
            }
        }
        self.persist(&entries)?;

        Ok(records.len())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredId>> {
        Ok(self.search(vector, top_k))
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut entries = self.entries.write();
        entries.retain(|e| !ids.contains(&e.id));
        self.persist(&entries)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().len())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
