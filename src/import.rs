//! Batch importer: embed candidate profiles and upsert them into the vector
//! index. Batches run sequentially with a fixed pause between them. A failed
//! item is logged and counted, never retried.

use chrono::Utc;

use crate::config::{ImportConfig, LlmConfig};
use crate::index::{VectorIndex, VectorRecord};
use crate::llm::embeddings::{embed_batch, embed_single};
use crate::models::{Candidate, ImportFailure, ImportProgress, ImportReport};

/// Import `candidates` into `index`. `on_progress` sees the running counters
/// after every batch.
pub async fn run_import<F>(
    client: &reqwest::Client,
    llm: &LlmConfig,
    index: &dyn VectorIndex,
    candidates: &[Candidate],
    settings: &ImportConfig,
    mut on_progress: F,
) -> ImportReport
where
    F: FnMut(&ImportProgress),
{
    let started_at = Utc::now();
    let batch_size = settings.batch_size.max(1);
    let batch_count = candidates.len().div_ceil(batch_size);

    let mut progress = ImportProgress {
        total: candidates.len(),
        ..ImportProgress::default()
    };
    let mut failures = Vec::new();

    tracing::info!(
        "Importing {} candidates in {} batches of up to {}",
        candidates.len(),
        batch_count,
        batch_size
    );

    for (batch_no, batch) in candidates.chunks(batch_size).enumerate() {
        let records = embed_records(client, llm, batch, &mut failures).await;

        if !records.is_empty() {
            match index.upsert(&records).await {
                Ok(stored) => {
                    if stored != records.len() {
                        tracing::warn!(
                            "Batch {}: index acknowledged {stored} of {} records",
                            batch_no + 1,
                            records.len()
                        );
                    }
                    progress.imported += records.len();
                }
                Err(e) => {
                    tracing::warn!("Batch {}: upsert failed: {e:#}", batch_no + 1);
                    failures.extend(records.iter().map(|r| ImportFailure {
                        id: r.id.clone(),
                        reason: format!("upsert failed: {e:#}"),
                    }));
                }
            }
        }

        progress.batches += 1;
        progress.processed += batch.len();
        progress.failed = failures.len();
        tracing::info!(
            "Batch {}/{}: {} imported, {} failed so far",
            batch_no + 1,
            batch_count,
            progress.imported,
            progress.failed
        );
        on_progress(&progress);

        if batch_no + 1 < batch_count && settings.batch_delay_ms > 0 {
            tokio::time::sleep(settings.batch_delay()).await;
        }
    }

    let report = ImportReport {
        total: progress.total,
        imported: progress.imported,
        failed: failures.len(),
        batches: progress.batches,
        failures,
        started_at,
        finished_at: Utc::now(),
    };
    tracing::info!(
        "Import finished: {} imported, {} failed of {}",
        report.imported,
        report.failed,
        report.total
    );
    report
}

/// Embed one batch. Falls back to one call per candidate when the batch call
/// fails, so one bad profile does not sink its neighbours.
async fn embed_records(
    client: &reqwest::Client,
    llm: &LlmConfig,
    batch: &[Candidate],
    failures: &mut Vec<ImportFailure>,
) -> Vec<VectorRecord> {
    let mut pending: Vec<(&Candidate, String)> = Vec::with_capacity(batch.len());
    for candidate in batch {
        let text = candidate.profile_text();
        if text.trim().is_empty() {
            tracing::warn!("Skipping candidate {}: empty profile", candidate.id);
            failures.push(ImportFailure {
                id: candidate.id.clone(),
                reason: "empty profile".to_string(),
            });
            continue;
        }
        pending.push((candidate, text));
    }

    if pending.is_empty() {
        return Vec::new();
    }

    let texts: Vec<String> = pending.iter().map(|(_, t)| t.clone()).collect();
    let embedded: Vec<(&Candidate, Result<Vec<f32>, String>)> =
        match embed_batch(client, llm, &texts).await {
            Ok(vectors) => pending
                .iter()
                .zip(vectors)
                .map(|((c, _), v)| (*c, Ok(v)))
                .collect(),
            Err(e) => {
                tracing::warn!(
                    "Batch embedding failed, embedding {} candidates one by one: {e:#}",
                    pending.len()
                );
                let mut out = Vec::with_capacity(pending.len());
                for (candidate, text) in &pending {
                    let result = embed_single(client, llm, text)
                        .await
                        .map_err(|e| format!("embedding failed: {e:#}"));
                    out.push((*candidate, result));
                }
                out
            }
        };

    let mut records = Vec::with_capacity(embedded.len());
    for (candidate, result) in embedded {
        let reason = match result {
            Ok(values) if values.len() == llm.embedding_dim => {
                records.push(to_record(candidate, values));
                continue;
            }
            Ok(values) => format!(
                "embedding has {} dimensions, expected {}",
                values.len(),
                llm.embedding_dim
            ),
            Err(reason) => reason,
        };
        tracing::warn!("Skipping candidate {}: {reason}", candidate.id);
        failures.push(ImportFailure {
            id: candidate.id.clone(),
            reason,
        });
    }
    records
}

fn to_record(candidate: &Candidate, values: Vec<f32>) -> VectorRecord {
    let mut metadata = serde_json::Map::new();
    metadata.insert("name".to_string(), candidate.name.clone().into());
    if let Some(title) = candidate.title.as_deref() {
        metadata.insert("title".to_string(), title.into());
    }
    VectorRecord {
        id: candidate.id.clone(),
        values,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_record_carries_name_and_title() {
        let c: Candidate = serde_json::from_value(serde_json::json!({
            "id": "c1", "name": "Ada", "title": "Engineer"
        }))
        .unwrap();
        let r = to_record(&c, vec![0.1, 0.2]);
        assert_eq!(r.id, "c1");
        assert_eq!(r.metadata["name"], "Ada");
        assert_eq!(r.metadata["title"], "Engineer");
    }

    #[tokio::test]
    async fn test_empty_profiles_fail_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let index = crate::index::LocalIndex::open_or_create(dir.path()).unwrap();
        let llm = LlmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..LlmConfig::default()
        };
        let candidates: Vec<Candidate> = serde_json::from_value(serde_json::json!([
            {"id": "a"}, {"id": "b"}, {"id": "c"}
        ]))
        .unwrap();
        let settings = ImportConfig {
            batch_size: 2,
            batch_delay_ms: 0,
        };

        let mut seen = Vec::new();
        let report = run_import(
            &reqwest::Client::new(),
            &llm,
            &index,
            &candidates,
            &settings,
            |p| seen.push(p.clone()),
        )
        .await;

        assert_eq!(report.total, 3);
        assert_eq!(report.imported, 0);
        assert_eq!(report.failed, 3);
        assert_eq!(report.batches, 2);
        assert!(report.failures.iter().all(|f| f.reason == "empty profile"));
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].processed, 3);
    }

    #[tokio::test]
    async fn test_zero_batch_size_runs_one_per_batch() {
        let dir = tempfile::tempdir().unwrap();
        let index = crate::index::LocalIndex::open_or_create(dir.path()).unwrap();
        let llm = LlmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..LlmConfig::default()
        };
        let candidates: Vec<Candidate> = serde_json::from_value(serde_json::json!([
            {"id": "a"}, {"id": "b"}, {"id": "c"}
        ]))
        .unwrap();
        let settings = ImportConfig {
            batch_size: 0,
            batch_delay_ms: 0,
        };

        let report = run_import(
            &reqwest::Client::new(),
            &llm,
            &index,
            &candidates,
            &settings,
            |_| {},
        )
        .await;

        assert_eq!(report.batches, 3);
        assert_eq!(report.imported + report.failed, report.total);
    }
}
