use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A candidate record as it appears in the local candidates file.
///
/// Only `id` is required. Fields the service does not know about are kept in
/// `extra` so API responses return the record as it was written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub years_experience: Option<f32>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Candidate files in the wild carry numeric ids as often as string ids.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s.trim().to_string(),
        Id::Int(n) => n.to_string(),
        Id::Uint(n) => n.to_string(),
    })
}

/// A candidate joined with its similarity score from the vector index. The
/// record stays nested so its own fields never collide with `score`.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateMatch {
    pub candidate: Candidate,
    pub score: f32,
}

/// Search request
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: Option<usize>,
}

/// Search response
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<CandidateMatch>,
}

/// Team assembly request
#[derive(Debug, Clone, Deserialize)]
pub struct TeamRequest {
    pub query: String,
    /// How many similar candidates the LLM gets to choose from
    pub pool_size: Option<usize>,
}

/// One selected team member
#[derive(Debug, Clone, Serialize)]
pub struct TeamMember {
    pub candidate: Candidate,
    pub score: f32,
    /// The part this person plays on the team
    pub role: String,
    pub reason: String,
}

/// Team assembly response
#[derive(Debug, Clone, Serialize)]
pub struct TeamResponse {
    pub query: String,
    pub team: Vec<TeamMember>,
    pub summary: String,
    pub candidates_considered: usize,
}

/// A single chat turn sent to the completions API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A background import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    pub id: Uuid,
    pub status: ImportStatus,
    pub candidates_path: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub progress: ImportProgress,
    pub report: Option<ImportReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Running,
    Completed,
    Failed(String),
}

/// Running counters reported after every batch
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImportProgress {
    pub total: usize,
    pub processed: usize,
    pub imported: usize,
    pub failed: usize,
    pub batches: usize,
}

/// A candidate that did not make it into the index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportFailure {
    pub id: String,
    pub reason: String,
}

/// Outcome of one import run. `imported + failed == total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub total: usize,
    pub imported: usize,
    pub failed: usize,
    pub batches: usize,
    pub failures: Vec<ImportFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
