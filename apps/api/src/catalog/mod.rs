//! Job catalog: the postings applicants are matched against.
//!
//! Reads are plain snapshots with no caching; callers re-fetch for freshness.
//! Storage errors propagate unchanged and are never retried here.

pub mod handlers;
pub mod prompts;
pub mod qualifications;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::job::{JobRow, JobStatus};

/// Validated title/description/status for a create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub status: JobStatus,
}

impl JobDraft {
    pub fn new(title: &str, description: &str, status: Option<&str>) -> Result<Self, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(AppError::Validation(
                "description cannot be empty".to_string(),
            ));
        }
        let status = match status {
            Some(raw) => raw.parse::<JobStatus>().map_err(AppError::Validation)?,
            None => JobStatus::default(),
        };
        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
            status,
        })
    }
}

#[async_trait]
pub trait JobCatalog: Send + Sync {
    /// All jobs, newest first.
    async fn list_jobs(&self) -> Result<Vec<JobRow>, AppError>;
    async fn get_job(&self, id: i64) -> Result<Option<JobRow>, AppError>;
    async fn create_job(&self, draft: &JobDraft) -> Result<JobRow, AppError>;
    async fn update_job(&self, id: i64, draft: &JobDraft) -> Result<Option<JobRow>, AppError>;
    async fn delete_job(&self, id: i64) -> Result<bool, AppError>;
    /// Replaces the qualification list wholesale.
    async fn set_qualifications(
        &self,
        id: i64,
        qualifications: &[String],
    ) -> Result<Option<JobRow>, AppError>;
}

pub struct PgJobCatalog {
    pool: PgPool,
}

impl PgJobCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobCatalog for PgJobCatalog {
    async fn list_jobs(&self) -> Result<Vec<JobRow>, AppError> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get_job(&self, id: i64) -> Result<Option<JobRow>, AppError> {
        Ok(sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_job(&self, draft: &JobDraft) -> Result<JobRow, AppError> {
        let job = sqlx::query_as::<_, JobRow>(
            "INSERT INTO jobs (title, description, status) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        info!(job_id = job.id, title = %job.title, "created job");
        Ok(job)
    }

    async fn update_job(&self, id: i64, draft: &JobDraft) -> Result<Option<JobRow>, AppError> {
        Ok(sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs SET title = $1, description = $2, status = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_job(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_qualifications(
        &self,
        id: i64,
        qualifications: &[String],
    ) -> Result<Option<JobRow>, AppError> {
        Ok(sqlx::query_as::<_, JobRow>(
            "UPDATE jobs SET qualifications = $1 WHERE id = $2 RETURNING *",
        )
        .bind(qualifications)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
