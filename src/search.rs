//! Query-time pipeline: embed the request, ask the index for the nearest
//! candidates, join them back onto the candidate file, and optionally hand
//! the pool to the chat model for team selection.

use anyhow::Result;

use crate::llm::embeddings::embed_single;
use crate::llm::team::select_team;
use crate::models::{CandidateMatch, TeamResponse};
use crate::state::AppState;

/// Top-k candidates most similar to `query`, best first.
pub async fn find_similar(state: &AppState, query: &str, top_k: usize) -> Result<Vec<CandidateMatch>> {
    let query = query.trim();
    if query.is_empty() || top_k == 0 {
        return Ok(Vec::new());
    }

    let embedding = embed_single(&state.http_client, &state.config.llm, query).await?;
    let matches = state.index.query(&embedding, top_k).await?;
    tracing::debug!("Index returned {} matches for {query:?}", matches.len());

    let joined = state.candidates.read().join(&matches);
    Ok(joined)
}

/// Retrieve a pool of `pool_size` similar candidates and have the chat model
/// pick a team of `config.search.team_size` from it.
pub async fn assemble_team(state: &AppState, query: &str, pool_size: usize) -> Result<TeamResponse> {
    let query = query.trim().to_string();
    let pool = find_similar(state, &query, pool_size).await?;

    if pool.is_empty() {
        return Ok(TeamResponse {
            query,
            team: Vec::new(),
            summary: "No candidates matched this request.".to_string(),
            candidates_considered: 0,
        });
    }

    let (team, summary) = select_team(
        &state.http_client,
        &state.config.llm,
        &query,
        &pool,
        state.config.search.team_size,
    )
    .await?;

    tracing::info!(
        "Assembled team of {} from {} candidates for {query:?}",
        team.len(),
        pool.len()
    );

    Ok(TeamResponse {
        query,
        team,
        summary,
        candidates_considered: pool.len(),
    })
}
