use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::candidates::CandidateStore;
use crate::import::run_import;
use crate::models::{ImportJob, ImportProgress, ImportReport, ImportStatus};
use crate::state::AppState;

/// POST /api/import - Reload the candidates file and import it into the
/// vector index in the background. One import runs at a time.
pub async fn start_import(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ImportJob>), (StatusCode, String)> {
    let permit = state
        .import_semaphore
        .clone()
        .try_acquire_owned()
        .map_err(|_| {
            (
                StatusCode::CONFLICT,
                "An import is already running".to_string(),
            )
        })?;

    let job = ImportJob {
        id: Uuid::new_v4(),
        status: ImportStatus::Running,
        candidates_path: state.config.candidates_path.display().to_string(),
        started_at: Utc::now(),
        finished_at: None,
        progress: ImportProgress::default(),
        report: None,
    };

    {
        let mut jobs = state.import_jobs.write();
        jobs.push(job.clone());
        drop(jobs);
        state.persist_jobs();
    }

    let job_id = job.id;
    let state_clone = state.clone();
    tokio::spawn(async move {
        let _permit = permit;
        run_job(state_clone, job_id).await;
    });

    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// GET /api/import - Import jobs, newest first
pub async fn list_imports(State(state): State<AppState>) -> Json<Vec<ImportJob>> {
    let mut jobs = state.import_jobs.read().clone();
    jobs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    Json(jobs)
}

/// GET /api/import/{id}
pub async fn get_import(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ImportJob>, (StatusCode, String)> {
    let job = state.import_jobs.read().iter().find(|j| j.id == id).cloned();
    job.map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Import job not found".to_string()))
}

/// Body of a background import job.
pub async fn run_job(state: AppState, job_id: Uuid) {
    let path = state.config.candidates_path.clone();
    let store = match tokio::task::spawn_blocking(move || CandidateStore::load(&path)).await {
        Ok(Ok(store)) => store,
        Ok(Err(e)) => {
            tracing::error!("Import {job_id} failed: {e:#}");
            finish_job(&state, job_id, ImportStatus::Failed(format!("{e:#}")), None);
            return;
        }
        Err(e) => {
            tracing::error!("Import {job_id} failed: {e}");
            finish_job(&state, job_id, ImportStatus::Failed(e.to_string()), None);
            return;
        }
    };

    let progress_state = state.clone();
    let report = run_import(
        &state.http_client,
        &state.config.llm,
        state.index.as_ref(),
        store.as_slice(),
        &state.config.import,
        move |progress| update_progress(&progress_state, job_id, progress),
    )
    .await;

    *state.candidates.write() = store;
    finish_job(&state, job_id, ImportStatus::Completed, Some(report));
}

fn update_progress(state: &AppState, job_id: Uuid, progress: &ImportProgress) {
    {
        let mut jobs = state.import_jobs.write();
        if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
            job.progress = progress.clone();
        }
    }
    state.persist_jobs();
}

fn finish_job(
    state: &AppState,
    job_id: Uuid,
    status: ImportStatus,
    report: Option<ImportReport>,
) {
    {
        let mut jobs = state.import_jobs.write();
        if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
            job.status = status;
            job.finished_at = Some(Utc::now());
            if let Some(report) = report {
                job.progress = ImportProgress {
                    total: report.total,
                    processed: report.total,
                    imported: report.imported,
                    failed: report.failed,
                    batches: report.batches,
                };
                job.report = Some(report);
            }
        }
    }
    state.persist_jobs();
}
