//! Axum route handlers for the job catalog.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::catalog::qualifications::generate_qualifications;
use crate::catalog::JobDraft;
use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QualificationsResponse {
    pub job_id: i64,
    pub qualifications: Vec<String>,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<JobRow>>, AppError> {
    Ok(Json(state.catalog.list_jobs().await?))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<JobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    let draft = JobDraft::new(
        &request.title,
        &request.description,
        request.status.as_deref(),
    )?;
    let job = state.catalog.create_job(&draft).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<JobRow>, AppError> {
    state
        .catalog
        .get_job(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// PUT /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<JobRequest>,
) -> Result<Json<JobRow>, AppError> {
    let draft = JobDraft::new(
        &request.title,
        &request.description,
        request.status.as_deref(),
    )?;
    state
        .catalog
        .update_job(id, &draft)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state.catalog.delete_job(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Job {id} not found")))
    }
}

/// POST /api/v1/jobs/:id/qualifications
///
/// Regenerates the job's qualification checklist from its description.
pub async fn handle_generate_qualifications(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<QualificationsResponse>, AppError> {
    let qualifications =
        generate_qualifications(state.catalog.as_ref(), state.drafter.as_ref(), id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    Ok(Json(QualificationsResponse {
        job_id: id,
        qualifications,
    }))
}
