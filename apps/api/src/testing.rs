//! In-memory implementations of every trait seam, plus fixtures, for unit tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use chrono::{Duration, Utc};
use sqlx::types::Json;

use crate::catalog::qualifications::QualificationDrafter;
use crate::catalog::{JobCatalog, JobDraft};
use crate::config::DEFAULT_MAX_INBOUND_BODY_BYTES;
use crate::errors::AppError;
use crate::intake::attachments::{AttachmentUploader, InboundAttachment};
use crate::intake::classifier::{ClassificationError, Classifier};
use crate::intake::engine::IntakeEngine;
use crate::intake::message::InboundMessage;
use crate::intake::repository::{
    ApplicantRepository, AttachmentRepository, NewApplicant, NewAttachment,
};
use crate::llm_client::LlmError;
use crate::models::applicant::{score_percentage, AiResult, ApplicantRow};
use crate::models::attachment::AttachmentRow;
use crate::models::job::JobRow;
use crate::state::AppState;
use crate::storage::{ObjectDescriptor, ObjectStore, StorageError};

pub const PUBLIC_URL: &str = "https://files.example.com";

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn job(id: i64, qualifications: &[&str]) -> JobRow {
    JobRow {
        id,
        title: format!("Job {id}"),
        description: format!("Description for job {id}"),
        qualifications: Some(qualifications.iter().map(|q| q.to_string()).collect()),
        status: "active".to_string(),
        created_at: Utc::now(),
    }
}

/// A verdict whose percentage is consistent with its checklist.
pub fn verdict(job_id: Option<i64>, checklist: &[(&str, bool)]) -> AiResult {
    let qualifications: BTreeMap<String, bool> = checklist
        .iter()
        .map(|(label, met)| (label.to_string(), *met))
        .collect();
    AiResult {
        job_id,
        reason: "fixture".to_string(),
        qualification_percentage: score_percentage(&qualifications),
        qualifications,
    }
}

pub fn message(from: &str, from_name: &str, body: &str) -> InboundMessage {
    InboundMessage {
        from: from.to_string(),
        from_name: from_name.to_string(),
        text_body: body.to_string(),
        attachments: Vec::new(),
    }
}

pub fn attachment(name: &str, payload: &[u8]) -> InboundAttachment {
    InboundAttachment {
        content: STANDARD.encode(payload),
        name: name.to_string(),
        content_id: String::new(),
        content_length: payload.len() as i64,
        content_type: "application/octet-stream".to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Catalog
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryCatalog {
    jobs: Mutex<Vec<JobRow>>,
}

impl InMemoryCatalog {
    pub fn with_jobs(jobs: Vec<JobRow>) -> Self {
        Self {
            jobs: Mutex::new(jobs),
        }
    }
}

#[async_trait]
impl JobCatalog for InMemoryCatalog {
    async fn list_jobs(&self) -> Result<Vec<JobRow>, AppError> {
        let mut jobs = self.jobs.lock().unwrap().clone();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(jobs)
    }

    async fn get_job(&self, id: i64) -> Result<Option<JobRow>, AppError> {
        Ok(self.jobs.lock().unwrap().iter().find(|j| j.id == id).cloned())
    }

    async fn create_job(&self, draft: &JobDraft) -> Result<JobRow, AppError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = JobRow {
            id: jobs.iter().map(|j| j.id).max().unwrap_or(0) + 1,
            title: draft.title.clone(),
            description: draft.description.clone(),
            qualifications: None,
            status: draft.status.as_str().to_string(),
            created_at: Utc::now(),
        };
        jobs.push(job.clone());
        Ok(job)
    }

    async fn update_job(&self, id: i64, draft: &JobDraft) -> Result<Option<JobRow>, AppError> {
        let mut jobs = self.jobs.lock().unwrap();
        Ok(jobs.iter_mut().find(|j| j.id == id).map(|job| {
            job.title = draft.title.clone();
            job.description = draft.description.clone();
            job.status = draft.status.as_str().to_string();
            job.clone()
        }))
    }

    async fn delete_job(&self, id: i64) -> Result<bool, AppError> {
        let mut jobs = self.jobs.lock().unwrap();
        let before = jobs.len();
        jobs.retain(|j| j.id != id);
        Ok(jobs.len() < before)
    }

    async fn set_qualifications(
        &self,
        id: i64,
        qualifications: &[String],
    ) -> Result<Option<JobRow>, AppError> {
        let mut jobs = self.jobs.lock().unwrap();
        Ok(jobs.iter_mut().find(|j| j.id == id).map(|job| {
            job.qualifications = Some(qualifications.to_vec());
            job.clone()
        }))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Applicants and attachments
// ────────────────────────────────────────────────────────────────────────────

/// Mirrors the Postgres repository, including the (email, job_id) upsert on insert.
#[derive(Default)]
pub struct InMemoryApplicants {
    rows: Mutex<Vec<ApplicantRow>>,
}

impl InMemoryApplicants {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn count_for(&self, email: &str, job_id: i64) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.email == email && row.job_id == Some(job_id))
            .count()
    }
}

#[async_trait]
impl ApplicantRepository for InMemoryApplicants {
    async fn find_by_email_and_job(
        &self,
        email: &str,
        job_id: i64,
    ) -> Result<Option<ApplicantRow>, AppError> {
        let found = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.email == email && row.job_id == Some(job_id))
            .cloned();
        // Let a concurrent intake run its own lookup before either one writes.
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn insert(&self, applicant: NewApplicant<'_>) -> Result<ApplicantRow, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows
            .iter_mut()
            .find(|row| row.email == applicant.email && row.job_id == Some(applicant.job_id))
        {
            existing.meta = Some(Json(applicant.meta.clone()));
            return Ok(existing.clone());
        }
        let id = rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
        let row = ApplicantRow {
            id,
            name: applicant.name.to_string(),
            email: applicant.email.to_string(),
            job_id: Some(applicant.job_id),
            email_body: applicant.email_body.to_string(),
            meta: Some(Json(applicant.meta.clone())),
            status: None,
            // Strictly increasing so "newest first" is deterministic.
            created_at: Utc::now() + Duration::milliseconds(id),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn reclassify(
        &self,
        id: i64,
        job_id: i64,
        meta: &AiResult,
    ) -> Result<ApplicantRow, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Applicant {id} not found")))?;
        row.job_id = Some(job_id);
        row.meta = Some(Json(meta.clone()));
        Ok(row.clone())
    }

    async fn set_status(
        &self,
        id: i64,
        status: Option<&str>,
    ) -> Result<Option<ApplicantRow>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|row| row.id == id).map(|row| {
            row.status = status.map(str::to_string);
            row.clone()
        }))
    }

    async fn list_for_job(&self, job_id: i64) -> Result<Vec<ApplicantRow>, AppError> {
        let mut rows: Vec<ApplicantRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.job_id == Some(job_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

/// Rows inserted for a file name passed to `fail_insert_for` fail like a lost connection.
#[derive(Default)]
pub struct InMemoryAttachments {
    rows: Mutex<Vec<AttachmentRow>>,
    failing: Mutex<Vec<String>>,
}

impl InMemoryAttachments {
    pub fn fail_insert_for(&self, file_name: &str) {
        self.failing.lock().unwrap().push(file_name.to_string());
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn count_for(&self, applicant_id: i64) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.applicant_id == applicant_id)
            .count()
    }
}

#[async_trait]
impl AttachmentRepository for InMemoryAttachments {
    async fn insert(&self, attachment: NewAttachment) -> Result<AttachmentRow, AppError> {
        if self.failing.lock().unwrap().contains(&attachment.file_name) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut rows = self.rows.lock().unwrap();
        let row = AttachmentRow {
            id: rows.len() as i64 + 1,
            applicant_id: attachment.applicant_id,
            file_url: attachment.file_url,
            file_name: attachment.file_name,
            content_type: attachment.content_type,
            size: attachment.size,
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list_for_applicants(
        &self,
        applicant_ids: &[i64],
    ) -> Result<Vec<AttachmentRow>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| applicant_ids.contains(&row.applicant_id))
            .cloned()
            .collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Object storage
// ────────────────────────────────────────────────────────────────────────────

/// Keeps uploads in memory. Payloads equal to `reject_payload` fail to upload.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, Bytes>>,
    rejected: Mutex<Option<Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn reject_payload(&self, payload: &[u8]) {
        *self.rejected.lock().unwrap() = Some(payload.to_vec());
    }

    pub fn count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        if self.rejected.lock().unwrap().as_deref() == Some(bytes.as_ref()) {
            return Err(StorageError::Upload {
                key: key.to_string(),
                message: "simulated outage".to_string(),
            });
        }
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(format!("{PUBLIC_URL}/{key}"))
    }

    async fn list_all(&self) -> Result<Vec<ObjectDescriptor>, StorageError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .map(|(key, bytes)| ObjectDescriptor {
                key: key.clone(),
                size: bytes.len() as i64,
                last_modified: None,
            })
            .collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Model stubs
// ────────────────────────────────────────────────────────────────────────────

/// Returns a preset verdict, or fails like an empty model response.
pub struct StubClassifier {
    verdict: Mutex<Option<AiResult>>,
    calls: AtomicUsize,
}

impl StubClassifier {
    pub fn returning(verdict: AiResult) -> Self {
        Self {
            verdict: Mutex::new(Some(verdict)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            verdict: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, verdict: AiResult) {
        *self.verdict.lock().unwrap() = Some(verdict);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify(
        &self,
        _email_text: &str,
        _jobs: &[JobRow],
    ) -> Result<AiResult, ClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict
            .lock()
            .unwrap()
            .clone()
            .ok_or(ClassificationError::Model(LlmError::EmptyContent))
    }
}

pub struct StubDrafter {
    labels: Vec<String>,
    calls: AtomicUsize,
}

impl StubDrafter {
    pub fn returning(labels: Vec<&str>) -> Self {
        Self {
            labels: labels.into_iter().map(str::to_string).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QualificationDrafter for StubDrafter {
    async fn draft(&self, _title: &str, _description: &str) -> Result<Vec<String>, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.labels.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wiring
// ────────────────────────────────────────────────────────────────────────────

/// Every backend in memory, with handles kept for assertions.
pub struct Fixture {
    pub catalog: Arc<InMemoryCatalog>,
    pub classifier: Arc<StubClassifier>,
    pub applicants: Arc<InMemoryApplicants>,
    pub attachments: Arc<InMemoryAttachments>,
    pub objects: Arc<MemoryObjectStore>,
    pub drafter: Arc<StubDrafter>,
}

impl Fixture {
    pub fn new(jobs: Vec<JobRow>, classifier: StubClassifier) -> Self {
        Self {
            catalog: Arc::new(InMemoryCatalog::with_jobs(jobs)),
            classifier: Arc::new(classifier),
            applicants: Arc::new(InMemoryApplicants::default()),
            attachments: Arc::new(InMemoryAttachments::default()),
            objects: Arc::new(MemoryObjectStore::default()),
            drafter: Arc::new(StubDrafter::returning(vec!["3+ years React", "TypeScript"])),
        }
    }

    pub fn engine(&self) -> IntakeEngine {
        IntakeEngine::new(
            self.catalog.clone(),
            self.classifier.clone(),
            self.applicants.clone(),
            AttachmentUploader::new(self.objects.clone(), self.attachments.clone()),
        )
    }

    pub fn state(&self) -> AppState {
        AppState {
            catalog: self.catalog.clone(),
            applicants: self.applicants.clone(),
            attachments: self.attachments.clone(),
            objects: self.objects.clone(),
            drafter: self.drafter.clone(),
            intake: self.engine(),
            max_inbound_body_bytes: DEFAULT_MAX_INBOUND_BODY_BYTES,
        }
    }
}
