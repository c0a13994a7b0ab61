//! Applicant and attachment persistence.
//!
//! Every write is a single statement, so row-level atomicity is the only
//! coordination between concurrent intakes.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::applicant::{AiResult, ApplicantRow};
use crate::models::attachment::AttachmentRow;

pub struct NewApplicant<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub email_body: &'a str,
    pub job_id: i64,
    pub meta: &'a AiResult,
}

pub struct NewAttachment {
    pub applicant_id: i64,
    pub file_url: String,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
}

#[async_trait]
pub trait ApplicantRepository: Send + Sync {
    async fn find_by_email_and_job(
        &self,
        email: &str,
        job_id: i64,
    ) -> Result<Option<ApplicantRow>, AppError>;

    /// Inserts a new applicant. A row that appeared for the same (email, job)
    /// since the lookup is updated in place instead (last write wins on `meta`).
    async fn insert(&self, applicant: NewApplicant<'_>) -> Result<ApplicantRow, AppError>;

    /// Re-affirms `job_id` and replaces `meta` wholesale. `status` and
    /// `email_body` are left untouched.
    async fn reclassify(
        &self,
        id: i64,
        job_id: i64,
        meta: &AiResult,
    ) -> Result<ApplicantRow, AppError>;

    /// Sets or clears the manual status override. `None` when the applicant is unknown.
    async fn set_status(
        &self,
        id: i64,
        status: Option<&str>,
    ) -> Result<Option<ApplicantRow>, AppError>;

    /// Applicants for a job, newest first.
    async fn list_for_job(&self, job_id: i64) -> Result<Vec<ApplicantRow>, AppError>;
}

#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    async fn insert(&self, attachment: NewAttachment) -> Result<AttachmentRow, AppError>;
    async fn list_for_applicants(
        &self,
        applicant_ids: &[i64],
    ) -> Result<Vec<AttachmentRow>, AppError>;
}

pub struct PgApplicantRepository {
    pool: PgPool,
}

impl PgApplicantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicantRepository for PgApplicantRepository {
    async fn find_by_email_and_job(
        &self,
        email: &str,
        job_id: i64,
    ) -> Result<Option<ApplicantRow>, AppError> {
        Ok(sqlx::query_as::<_, ApplicantRow>(
            "SELECT * FROM applicants WHERE email = $1 AND job_id = $2",
        )
        .bind(email)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert(&self, applicant: NewApplicant<'_>) -> Result<ApplicantRow, AppError> {
        Ok(sqlx::query_as::<_, ApplicantRow>(
            r#"
            INSERT INTO applicants (name, email, email_body, job_id, meta)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email, job_id)
            DO UPDATE SET job_id = EXCLUDED.job_id, meta = EXCLUDED.meta
            RETURNING *
            "#,
        )
        .bind(applicant.name)
        .bind(applicant.email)
        .bind(applicant.email_body)
        .bind(applicant.job_id)
        .bind(Json(applicant.meta))
        .fetch_one(&self.pool)
        .await?)
    }

    async fn reclassify(
        &self,
        id: i64,
        job_id: i64,
        meta: &AiResult,
    ) -> Result<ApplicantRow, AppError> {
        sqlx::query_as::<_, ApplicantRow>(
            "UPDATE applicants SET job_id = $1, meta = $2 WHERE id = $3 RETURNING *",
        )
        .bind(job_id)
        .bind(Json(meta))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Applicant {id} not found")))
    }

    async fn set_status(
        &self,
        id: i64,
        status: Option<&str>,
    ) -> Result<Option<ApplicantRow>, AppError> {
        Ok(sqlx::query_as::<_, ApplicantRow>(
            "UPDATE applicants SET status = $1 WHERE id = $2 RETURNING *",
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_for_job(&self, job_id: i64) -> Result<Vec<ApplicantRow>, AppError> {
        Ok(sqlx::query_as::<_, ApplicantRow>(
            "SELECT * FROM applicants WHERE job_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

pub struct PgAttachmentRepository {
    pool: PgPool,
}

impl PgAttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    async fn insert(&self, attachment: NewAttachment) -> Result<AttachmentRow, AppError> {
        Ok(sqlx::query_as::<_, AttachmentRow>(
            r#"
            INSERT INTO attachments (applicant_id, file_url, file_name, content_type, size)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(attachment.applicant_id)
        .bind(&attachment.file_url)
        .bind(&attachment.file_name)
        .bind(&attachment.content_type)
        .bind(attachment.size)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_for_applicants(
        &self,
        applicant_ids: &[i64],
    ) -> Result<Vec<AttachmentRow>, AppError> {
        if applicant_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(sqlx::query_as::<_, AttachmentRow>(
            "SELECT * FROM attachments WHERE applicant_id = ANY($1) ORDER BY id",
        )
        .bind(applicant_ids)
        .fetch_all(&self.pool)
        .await?)
    }
}
