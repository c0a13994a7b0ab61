//! Status Resolver: the display status shown in the applicant list.
//!
//! Derived on read from the manual override and the stored verdict; never persisted.

use serde::{Serialize, Serializer};

use crate::models::applicant::{AiResult, ApplicantRow};

/// Minimum qualification percentage for `passed`.
pub const PASS_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayStatus {
    Passed,
    Failed,
    Pending,
    Shortlisted,
    /// Any other manual override, shown verbatim.
    Manual(String),
}

impl DisplayStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DisplayStatus::Passed => "passed",
            DisplayStatus::Failed => "failed",
            DisplayStatus::Pending => "pending",
            DisplayStatus::Shortlisted => "shortlisted",
            DisplayStatus::Manual(label) => label,
        }
    }

    fn from_override(label: &str) -> Self {
        match label {
            "passed" => DisplayStatus::Passed,
            "failed" => DisplayStatus::Failed,
            "pending" => DisplayStatus::Pending,
            "shortlisted" => DisplayStatus::Shortlisted,
            other => DisplayStatus::Manual(other.to_string()),
        }
    }
}

impl Serialize for DisplayStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Override wins; otherwise no computed score means `pending`, then the threshold decides.
pub fn resolve(manual: Option<&str>, verdict: Option<&AiResult>) -> DisplayStatus {
    if let Some(label) = manual.map(str::trim).filter(|label| !label.is_empty()) {
        return DisplayStatus::from_override(label);
    }
    match verdict {
        Some(verdict) if verdict.has_score() => {
            if verdict.percentage() >= PASS_THRESHOLD {
                DisplayStatus::Passed
            } else {
                DisplayStatus::Failed
            }
        }
        _ => DisplayStatus::Pending,
    }
}

pub fn display_status(applicant: &ApplicantRow) -> DisplayStatus {
    resolve(applicant.status.as_deref(), applicant.verdict())
}
