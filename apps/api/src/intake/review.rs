//! Reviewer-facing reads and the manual status override.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::intake::repository::{ApplicantRepository, AttachmentRepository};
use crate::intake::status::{display_status, DisplayStatus};
use crate::models::applicant::ApplicantRow;
use crate::models::attachment::AttachmentRow;

#[derive(Debug, Serialize)]
pub struct ApplicantView {
    #[serde(flatten)]
    pub applicant: ApplicantRow,
    pub display_status: DisplayStatus,
    pub attachments: Vec<AttachmentRow>,
}

impl ApplicantView {
    pub fn new(applicant: ApplicantRow, attachments: Vec<AttachmentRow>) -> Self {
        Self {
            display_status: display_status(&applicant),
            applicant,
            attachments,
        }
    }
}

/// Applicants for a job, newest first, each with attachments and display status.
pub async fn list_applicants_for_job(
    applicants: &dyn ApplicantRepository,
    attachments: &dyn AttachmentRepository,
    job_id: i64,
) -> Result<Vec<ApplicantView>, AppError> {
    let rows = applicants.list_for_job(job_id).await?;
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

    let mut by_applicant: HashMap<i64, Vec<AttachmentRow>> = HashMap::new();
    for attachment in attachments.list_for_applicants(&ids).await? {
        by_applicant
            .entry(attachment.applicant_id)
            .or_default()
            .push(attachment);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let files = by_applicant.remove(&row.id).unwrap_or_default();
            ApplicantView::new(row, files)
        })
        .collect())
}

/// Sets or clears the manual override. A blank label clears it.
pub async fn set_manual_status(
    applicants: &dyn ApplicantRepository,
    applicant_id: i64,
    status: Option<&str>,
) -> Result<ApplicantView, AppError> {
    let status = status.map(str::trim).filter(|label| !label.is_empty());
    let row = applicants
        .set_status(applicant_id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Applicant {applicant_id} not found")))?;

    info!(applicant_id, status = ?row.status, "updated manual status");
    Ok(ApplicantView::new(row, Vec::new()))
}
