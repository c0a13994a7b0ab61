//! Applicant Upsert Engine: the intake orchestrator.
//!
//! classify -> resolve (email, job) identity -> create or update -> attach files.
//! Nothing is written before classification succeeds, and attachments are only
//! processed once the applicant row exists.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::catalog::JobCatalog;
use crate::errors::AppError;
use crate::intake::attachments::{extract, AttachmentReport, AttachmentUploader};
use crate::intake::classifier::Classifier;
use crate::intake::message::InboundMessage;
use crate::intake::repository::{ApplicantRepository, NewApplicant};
use crate::models::applicant::ApplicantRow;

#[derive(Debug)]
pub enum IntakeOutcome {
    Applied {
        applicant: ApplicantRow,
        /// False when an existing (email, job) row was re-classified.
        created: bool,
        attachments: AttachmentReport,
    },
    /// The classifier found no job for the email. Nothing was written.
    NoJobMatch { reason: String },
}

#[derive(Clone)]
pub struct IntakeEngine {
    catalog: Arc<dyn JobCatalog>,
    classifier: Arc<dyn Classifier>,
    applicants: Arc<dyn ApplicantRepository>,
    uploader: AttachmentUploader,
}

impl IntakeEngine {
    pub fn new(
        catalog: Arc<dyn JobCatalog>,
        classifier: Arc<dyn Classifier>,
        applicants: Arc<dyn ApplicantRepository>,
        uploader: AttachmentUploader,
    ) -> Self {
        Self {
            catalog,
            classifier,
            applicants,
            uploader,
        }
    }

    #[instrument(skip_all, fields(sender = %message.sender()))]
    pub async fn intake(&self, message: InboundMessage) -> Result<IntakeOutcome, AppError> {
        message.validate()?;

        // Decoding needs no I/O, so it runs before the classifier call.
        let extracted = extract(&message.attachments);

        let jobs = self.catalog.list_jobs().await?;
        let verdict = self.classifier.classify(&message.text_body, &jobs).await?;

        let Some(job_id) = verdict.job_id else {
            info!(reason = %verdict.reason, "no matching job; nothing stored");
            return Ok(IntakeOutcome::NoJobMatch {
                reason: verdict.reason,
            });
        };

        let email = message.sender();
        let (applicant, created) = match self
            .applicants
            .find_by_email_and_job(email, job_id)
            .await?
        {
            Some(existing) => {
                let updated = self
                    .applicants
                    .reclassify(existing.id, job_id, &verdict)
                    .await?;
                info!(applicant_id = updated.id, job_id, "re-classified existing applicant");
                (updated, false)
            }
            None => {
                let inserted = self
                    .applicants
                    .insert(NewApplicant {
                        name: message.display_name(),
                        email,
                        email_body: &message.text_body,
                        job_id,
                        meta: &verdict,
                    })
                    .await?;
                info!(applicant_id = inserted.id, job_id, "created applicant");
                (inserted, true)
            }
        };

        let attachments = self.uploader.upload_all(applicant.id, extracted).await;

        Ok(IntakeOutcome::Applied {
            applicant,
            created,
            attachments,
        })
    }
}
