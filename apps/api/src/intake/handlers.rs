//! Axum route handlers for intake and applicant review.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::intake::attachments::AttachmentReport;
use crate::intake::engine::IntakeOutcome;
use crate::intake::message::InboundMessage;
use crate::intake::review::{list_applicants_for_job, set_manual_status, ApplicantView};
use crate::models::applicant::ApplicantRow;
use crate::state::AppState;

pub const NO_MATCH_ERROR: &str = "Job not found";

/// Webhook reply. The two shapes are told apart by their keys.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum IntakeReply {
    Applied {
        applicant: ApplicantRow,
        created: bool,
        attachments: AttachmentReport,
    },
    NoJobMatch {
        error: &'static str,
    },
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// POST /api/v1/inbound/email
///
/// Mail-provider webhook. A message that matches no job still answers 200,
/// with `{"error": "Job not found"}` instead of an applicant.
/// Body rejections (over the size limit, unreadable) are answered as JSON too.
pub async fn handle_inbound_email(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<IntakeReply>, AppError> {
    let body = body.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(rejection.body_text()),
        _ => AppError::Validation(rejection.body_text()),
    })?;
    let message = InboundMessage::from_slice(&body)?;

    let reply = match state.intake.intake(message).await? {
        IntakeOutcome::Applied {
            applicant,
            created,
            attachments,
        } => IntakeReply::Applied {
            applicant,
            created,
            attachments,
        },
        IntakeOutcome::NoJobMatch { reason } => {
            debug!(%reason, "answering inbound email with no job match");
            IntakeReply::NoJobMatch {
                error: NO_MATCH_ERROR,
            }
        }
    };

    Ok(Json(reply))
}

/// GET /api/v1/jobs/:id/applicants
pub async fn handle_list_applicants(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<Vec<ApplicantView>>, AppError> {
    if state.catalog.get_job(job_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }
    let views = list_applicants_for_job(
        state.applicants.as_ref(),
        state.attachments.as_ref(),
        job_id,
    )
    .await?;
    Ok(Json(views))
}

/// PATCH /api/v1/applicants/:id/status
///
/// `{"status": "shortlisted"}` sets the override; `null` or blank clears it.
pub async fn handle_set_status(
    State(state): State<AppState>,
    Path(applicant_id): Path<i64>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<ApplicantView>, AppError> {
    let view = set_manual_status(
        state.applicants.as_ref(),
        applicant_id,
        request.status.as_deref(),
    )
    .await?;
    Ok(Json(view))
}
