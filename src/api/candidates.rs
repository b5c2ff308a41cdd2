use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::internal_error;
use crate::models::Candidate;
use crate::state::AppState;

const MAX_PAGE: usize = 200;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CandidatePage {
    pub total: usize,
    pub offset: usize,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub candidates: usize,
    pub indexed: usize,
    pub index_backend: &'static str,
}

/// GET /api/health - Candidate count and the index's vector count
pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, String)> {
    let indexed = state
        .index
        .count()
        .await
        .map_err(|e| internal_error("Vector index stats failed", e))?;

    let candidates = state.candidates.read().len();

    Ok(Json(HealthResponse {
        status: "ok",
        candidates,
        indexed,
        index_backend: state.config.index.backend.as_str(),
    }))
}

/// GET /api/candidates - Page through the candidate file in file order
pub async fn list_candidates(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<CandidatePage> {
    let limit = params.limit.unwrap_or(50).min(MAX_PAGE);
    let store = state.candidates.read();

    Json(CandidatePage {
        total: store.len(),
        offset: params.offset,
        candidates: store
            .iter()
            .skip(params.offset)
            .take(limit)
            .cloned()
            .collect(),
    })
}

/// GET /api/candidates/{id}
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Candidate>, (StatusCode, String)> {
    let candidate = state.candidates.read().get(id.trim()).cloned();
    candidate
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Candidate not found".to_string()))
}
