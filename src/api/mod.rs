//! Axum HTTP handlers.

pub mod candidates;
pub mod import;
pub mod search;

use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

const INTERNAL_ERROR: &str = "Internal server error";

/// Log the full error chain and answer with a generic 500. Upstream service
/// errors can echo API keys or request bodies, so none of it leaves the server.
pub(crate) fn internal_error(context: &str, err: anyhow::Error) -> (StatusCode, String) {
    tracing::error!("{context}: {err:#}");
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
}

/// All routes, with the search form served at `/`.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Serve frontend
        .route("/", get(serve_index))
        // API routes
        .route("/api/health", get(candidates::health))
        .route("/api/candidates", get(candidates::list_candidates))
        .route("/api/candidates/{id}", get(candidates::get_candidate))
        .route("/api/search", post(search::search))
        .route("/api/team", post(search::team))
        .route("/api/import", get(import::list_imports))
        .route("/api/import", post(import::start_import))
        .route("/api/import/{id}", get(import::get_import))
        .with_state(state)
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
