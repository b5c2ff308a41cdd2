//! Client for a hosted Pinecone-compatible index, addressed by its index host.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::{ScoredId, VectorIndex, VectorRecord};
use crate::config::IndexConfig;

pub struct PineconeIndex {
    client: reqwest::Client,
    host: String,
    api_key: String,
    namespace: String,
    timeout: Duration,
}

impl PineconeIndex {
    pub fn new(client: reqwest::Client, config: &IndexConfig) -> Result<Self> {
        let host = config
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .context("Vector index host not configured")?;
        let api_key = config
            .api_key
            .as_deref()
            .context("Vector index API key not configured")?;

        // The console shows bare hostnames; accept them as-is.
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", host.trim_end_matches('/'))
        };

        Ok(Self {
            client,
            host,
            api_key: api_key.to_string(),
            namespace: config.namespace.clone(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        })
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let url = format!("{}{path}", self.host);

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to call vector index {path}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Vector index {path} returned {status}: {body}");
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse vector index {path} response"))
    }
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    namespace: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    namespace: &'a str,
    include_values: bool,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [String],
    namespace: &'a str,
}

#[derive(Serialize)]
struct StatsRequest {}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceStats>,
    #[serde(default)]
    total_vector_count: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    #[serde(default)]
    vector_count: usize,
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let resp: UpsertResponse = self
            .post(
                "/vectors/upsert",
                &UpsertRequest {
                    vectors: records,
                    namespace: &self.namespace,
                },
            )
            .await?;
        Ok(resp.upserted_count)
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredId>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let resp: QueryResponse = self
            .post(
                "/query",
                &QueryRequest {
                    vector,
                    top_k,
                    namespace: &self.namespace,
                    include_values: false,
                    include_metadata: false,
                },
            )
            .await?;

        let mut matches: Vec<ScoredId> = resp
            .matches
            .into_iter()
            .map(|m| ScoredId {
                id: m.id,
                score: m.score,
            })
            .collect();
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let _: serde_json::Value = self
            .post(
                "/vectors/delete",
                &DeleteRequest {
                    ids,
                    namespace: &self.namespace,
                },
            )
            .await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let stats: StatsResponse = self.post("/describe_index_stats", &StatsRequest {}).await?;
        Ok(stats
            .namespaces
            .get(&self.namespace)
            .map(|ns| ns.vector_count)
            .unwrap_or(if self.namespace.is_empty() {
                stats.total_vector_count
            } else {
                0
            }))
    }
}
