//! Applicant Classifier: one model call per email, then a strict check of the
//! verdict against the catalog snapshot it was produced from.
//!
//! A verdict is only accepted when it either names no job, or names a job from
//! the snapshot and scores exactly that job's qualification labels. The
//! percentage is always recomputed from the checklist.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::intake::prompts::CLASSIFY_SYSTEM_TEMPLATE;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::applicant::{score_percentage, AiResult};
use crate::models::job::JobRow;

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("job catalog could not be serialized: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("verdict names job {0}, which is not in the catalog")]
    UnknownJob(i64),

    #[error("verdict for job {job_id} does not score its qualifications (missing: {missing:?}, unexpected: {unexpected:?})")]
    QualificationMismatch {
        job_id: i64,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        email_text: &str,
        jobs: &[JobRow],
    ) -> Result<AiResult, ClassificationError>;
}

/// Verdict as the model writes it. The percentage may come back fractional.
#[derive(Debug, Deserialize)]
pub struct RawVerdict {
    #[serde(default)]
    pub job_id: Option<i64>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub qualifications: BTreeMap<String, bool>,
    #[serde(default, rename = "qualificationPercentage")]
    pub qualification_percentage: Option<f64>,
}

#[derive(Serialize)]
struct CatalogEntry<'a> {
    id: i64,
    title: &'a str,
    description: &'a str,
    qualifications: &'a [String],
    status: &'a str,
}

/// System instructions with the catalog snapshot embedded as JSON.
pub fn build_instructions(jobs: &[JobRow]) -> Result<String, serde_json::Error> {
    let entries: Vec<CatalogEntry<'_>> = jobs
        .iter()
        .map(|job| CatalogEntry {
            id: job.id,
            title: &job.title,
            description: &job.description,
            qualifications: job.qualification_labels(),
            status: &job.status,
        })
        .collect();
    let jobs_json = serde_json::to_string_pretty(&entries)?;
    Ok(format!(
        "{} {JSON_ONLY_SYSTEM}",
        CLASSIFY_SYSTEM_TEMPLATE.replace("{jobs_json}", &jobs_json)
    ))
}

/// Checks a raw verdict against the snapshot and normalizes it into an `AiResult`.
pub fn finalize_verdict(
    raw: RawVerdict,
    jobs: &[JobRow],
) -> Result<AiResult, ClassificationError> {
    let Some(job_id) = raw.job_id else {
        return Ok(AiResult {
            job_id: None,
            reason: raw.reason,
            qualifications: BTreeMap::new(),
            qualification_percentage: None,
        });
    };

    let job = jobs
        .iter()
        .find(|job| job.id == job_id)
        .ok_or(ClassificationError::UnknownJob(job_id))?;

    let labels = job.qualification_labels();
    let missing: Vec<String> = labels
        .iter()
        .filter(|label| !raw.qualifications.contains_key(label.as_str()))
        .cloned()
        .collect();
    let unexpected: Vec<String> = raw
        .qualifications
        .keys()
        .filter(|key| !labels.contains(*key))
        .cloned()
        .collect();
    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(ClassificationError::QualificationMismatch {
            job_id,
            missing,
            unexpected,
        });
    }

    let percentage = score_percentage(&raw.qualifications);
    if let (Some(reported), Some(computed)) = (raw.qualification_percentage, percentage) {
        if reported.round() as u32 != computed {
            warn!(
                job_id,
                reported, computed, "model percentage disagrees with its checklist; using computed"
            );
        }
    }

    Ok(AiResult {
        job_id: Some(job_id),
        reason: raw.reason,
        qualifications: raw.qualifications,
        qualification_percentage: percentage,
    })
}

pub struct LlmClassifier {
    llm: LlmClient,
}

impl LlmClassifier {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(
        &self,
        email_text: &str,
        jobs: &[JobRow],
    ) -> Result<AiResult, ClassificationError> {
        let instructions = build_instructions(jobs)?;
        let raw: RawVerdict = self.llm.complete_json(&instructions, email_text).await?;
        debug!(job_id = ?raw.job_id, "model verdict received");
        finalize_verdict(raw, jobs)
    }
}
