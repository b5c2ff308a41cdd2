//! The local candidate file: the source of truth that vector search results
//! are joined back onto.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt::Write;
use std::path::Path;

use crate::index::ScoredId;
use crate::models::{Candidate, CandidateMatch};

/// In-memory view of the candidates file, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct CandidateStore {
    candidates: Vec<Candidate>,
    by_id: HashMap<String, usize>,
}

impl CandidateStore {
    /// Load a JSON array of candidate records. Records that do not parse as
    /// a candidate are skipped with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read candidates file {}", path.display()))?;
        let raw: Vec<serde_json::Value> = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse candidates file {}", path.display()))?;

        let mut records = Vec::with_capacity(raw.len());
        for (i, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<Candidate>(value) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    "Skipping candidate record {i} in {}: {e}",
                    path.display()
                ),
            }
        }

        let store = Self::from_records(records);
        tracing::info!("Loaded {} candidates from {}", store.len(), path.display());
        Ok(store)
    }

    /// Build a store from records, skipping blank ids and keeping the first
    /// occurrence of a duplicated id.
    pub fn from_records(records: Vec<Candidate>) -> Self {
        let mut candidates = Vec::with_capacity(records.len());
        let mut by_id = HashMap::with_capacity(records.len());

        for record in records {
            if record.id.is_empty() {
                tracing::warn!("Skipping candidate with blank id (name: {:?})", record.name);
                continue;
            }
            if by_id.contains_key(&record.id) {
                tracing::warn!("Duplicate candidate id {}, keeping first record", record.id);
                continue;
            }
            by_id.insert(record.id.clone(), candidates.len());
            candidates.push(record);
        }

        Self { candidates, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.by_id.get(id).map(|&i| &self.candidates[i])
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Attach index scores to candidate records, preserving match order.
    /// Ids the index knows about but the file does not are dropped.
    pub fn join(&self, matches: &[ScoredId]) -> Vec<CandidateMatch> {
        matches
            .iter()
            .filter_map(|m| match self.get(&m.id) {
                Some(candidate) => Some(CandidateMatch {
                    candidate: candidate.clone(),
                    score: m.score,
                }),
                None => {
                    tracing::warn!("Index returned unknown candidate id {}", m.id);
                    None
                }
            })
            .collect()
    }
}

impl Candidate {
    /// Plain-text rendering of the profile, used as embedding input and in
    /// the team selection prompt. Blank when the record carries nothing
    /// beyond its id.
    pub fn profile_text(&self) -> String {
        let mut out = String::new();

        if !self.name.trim().is_empty() {
            let _ = writeln!(out, "Name: {}", self.name.trim());
        }
        if let Some(title) = non_blank(&self.title) {
            let _ = writeln!(out, "Title: {title}");
        }
        let skills: Vec<&str> = self
            .skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if !skills.is_empty() {
            let _ = writeln!(out, "Skills: {}", skills.join(", "));
        }
        if let Some(years) = self.years_experience {
            let _ = writeln!(out, "Experience: {years} years");
        }
        if let Some(location) = non_blank(&self.location) {
            let _ = writeln!(out, "Location: {location}");
        }
        if let Some(summary) = non_blank(&self.summary) {
            let _ = writeln!(out, "Summary: {summary}");
        }

        // serde_json::Map is a BTreeMap, so keys come out sorted
        for (key, value) in &self.extra {
            let rendered = match value {
                serde_json::Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Array(items) => {
                    let parts: Vec<String> = items
                        .iter()
                        .filter_map(|v| match v {
                            serde_json::Value::String(s) => Some(s.trim().to_string()),
                            serde_json::Value::Number(n) => Some(n.to_string()),
                            _ => None,
                        })
                        .filter(|s| !s.is_empty())
                        .collect();
                    if parts.is_empty() {
                        continue;
                    }
                    parts.join(", ")
                }
                _ => continue,
            };
            let _ = writeln!(out, "{}: {rendered}", humanize_key(key));
        }

        out.trim_end().to_string()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// "preferred_stack" -> "Preferred stack"
fn humanize_key(key: &str) -> String {
    let spaced = key.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
