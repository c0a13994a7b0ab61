//! Qualification Generator: asks the model for a checklist derived from a job
//! description and writes it onto the job.
//!
//! Regenerating replaces the list wholesale. Applicants already scored against
//! the previous list keep their old verdict until they are classified again.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::catalog::prompts::{QUALIFICATIONS_PROMPT, QUALIFICATIONS_SYSTEM};
use crate::catalog::JobCatalog;
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};

#[async_trait]
pub trait QualificationDrafter: Send + Sync {
    async fn draft(&self, title: &str, description: &str) -> Result<Vec<String>, LlmError>;
}

pub struct LlmQualificationDrafter {
    llm: LlmClient,
}

impl LlmQualificationDrafter {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl QualificationDrafter for LlmQualificationDrafter {
    async fn draft(&self, title: &str, description: &str) -> Result<Vec<String>, LlmError> {
        let prompt = QUALIFICATIONS_PROMPT
            .replace("{title}", title)
            .replace("{description}", description);
        let system = format!("{QUALIFICATIONS_SYSTEM} {JSON_ONLY_SYSTEM}");
        self.llm.complete_json::<Vec<String>>(&system, &prompt).await
    }
}

/// Trims labels, drops blanks and removes duplicates, keeping first occurrence order.
pub fn normalize_labels(raw: Vec<String>) -> Vec<String> {
    let mut labels: Vec<String> = Vec::with_capacity(raw.len());
    for label in raw {
        let label = label.trim();
        if label.is_empty() || labels.iter().any(|existing| existing == label) {
            continue;
        }
        labels.push(label.to_string());
    }
    labels
}

/// Generates and stores the qualification list for `job_id`.
///
/// Returns `Ok(None)` when the job does not exist, and an empty list when the
/// description implies no qualifications.
pub async fn generate_qualifications(
    catalog: &dyn JobCatalog,
    drafter: &dyn QualificationDrafter,
    job_id: i64,
) -> Result<Option<Vec<String>>, AppError> {
    let Some(job) = catalog.get_job(job_id).await? else {
        return Ok(None);
    };

    let labels = normalize_labels(drafter.draft(&job.title, &job.description).await?);

    if let Some(previous) = job.qualifications.as_ref() {
        if !previous.is_empty() && previous != &labels {
            warn!(
                job_id,
                previous = previous.len(),
                replacement = labels.len(),
                "replacing qualification list; existing applicant scores refer to the old list"
            );
        }
    }

    // The job can disappear between the read and the write.
    if catalog.set_qualifications(job_id, &labels).await?.is_none() {
        return Ok(None);
    }

    info!(job_id, count = labels.len(), "stored generated qualifications");
    Ok(Some(labels))
}
