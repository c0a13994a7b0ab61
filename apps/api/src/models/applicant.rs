use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Classification verdict stored on the applicant as `meta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiResult {
    /// `None` means no job in the catalog matched the email.
    #[serde(default)]
    pub job_id: Option<i64>,
    #[serde(default)]
    pub reason: String,
    /// Qualification label -> met. Keys mirror the matched job's labels.
    #[serde(default)]
    pub qualifications: BTreeMap<String, bool>,
    /// 0-100. `None` when the matched job had no qualification labels.
    #[serde(default, rename = "qualificationPercentage")]
    pub qualification_percentage: Option<u32>,
}

impl AiResult {
    /// Percentage with the undefined case read as 0.
    pub fn percentage(&self) -> u32 {
        self.qualification_percentage.unwrap_or(0)
    }

    /// True when a score was actually computed against at least one label.
    pub fn has_score(&self) -> bool {
        self.qualification_percentage.is_some() && !self.qualifications.is_empty()
    }
}

/// `round(100 * met / total)`, or `None` for an empty checklist.
pub fn score_percentage(qualifications: &BTreeMap<String, bool>) -> Option<u32> {
    if qualifications.is_empty() {
        return None;
    }
    let met = qualifications.values().filter(|met| **met).count();
    Some((100.0 * met as f64 / qualifications.len() as f64).round() as u32)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicantRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub job_id: Option<i64>,
    pub email_body: String,
    pub meta: Option<Json<AiResult>>,
    /// Manual override such as `shortlisted`. Never written by classification.
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ApplicantRow {
    pub fn verdict(&self) -> Option<&AiResult> {
        self.meta.as_ref().map(|meta| &meta.0)
    }
}
