use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// `None` until the qualification generator has run for this job.
    pub qualifications: Option<Vec<String>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl JobRow {
    /// Qualification labels in catalog order. Empty when none were generated.
    pub fn qualification_labels(&self) -> &[String] {
        self.qualifications.as_deref().unwrap_or(&[])
    }
}

/// Lifecycle state of a posting. `draft` is accepted on input as an alias of `pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Closed,
    #[default]
    #[serde(alias = "draft")]
    Pending,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
            JobStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(JobStatus::Active),
            "closed" => Ok(JobStatus::Closed),
            "pending" | "draft" => Ok(JobStatus::Pending),
            other => Err(format!(
                "unknown job status '{other}' (expected active, closed or pending)"
            )),
        }
    }
}
