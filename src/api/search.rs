use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::internal_error;
use crate::models::{SearchRequest, SearchResponse, TeamRequest, TeamResponse};
use crate::search::{assemble_team, find_similar};
use crate::state::AppState;

/// POST /api/search - Candidates most similar to the query
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Query is required".to_string()));
    }

    let top_k = state
        .config
        .clamp_top_k(req.top_k, state.config.search.pool_size);

    let results = find_similar(&state, &query, top_k)
        .await
        .map_err(|e| internal_error("Candidate search failed", e))?;

    Ok(Json(SearchResponse { query, results }))
}

/// POST /api/team - Assemble a diverse team from the most similar candidates:
///   1. Embed the request and retrieve `pool_size` candidates from the index
///   2. Join ids back onto the candidate file
///   3. Ask the chat model to pick the team, keeping only ids from the pool
pub async fn team(
    State(state): State<AppState>,
    Json(req): Json<TeamRequest>,
) -> Result<Json<TeamResponse>, (StatusCode, String)> {
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Query is required".to_string()));
    }

    let pool_size = state
        .config
        .clamp_top_k(req.pool_size, state.config.search.pool_size);

    let response = assemble_team(&state, &query, pool_size)
        .await
        .map_err(|e| internal_error("Team assembly failed", e))?;

    Ok(Json(response))
}
