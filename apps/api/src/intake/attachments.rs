//! Attachment Extractor/Uploader.
//!
//! Files are enrichment, not the primary record: each one is decoded, uploaded
//! and recorded on its own task, and a failure only removes that file from the
//! result. The outcome is returned as an `AttachmentReport`.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::repository::{AttachmentRepository, NewAttachment};
use crate::models::attachment::AttachmentRow;
use crate::storage::{ObjectStore, StorageError};

const KEY_PREFIX: &str = "attachments";
const FALLBACK_EXTENSION: &str = "bin";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
const MAX_EXTENSION_LEN: usize = 10;

/// One attachment as the mail provider delivers it.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundAttachment {
    #[serde(rename = "Content", default)]
    pub content: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "ContentID", default)]
    pub content_id: String,
    #[serde(rename = "ContentLength", default)]
    pub content_length: i64,
    #[serde(rename = "ContentType", default)]
    pub content_type: String,
}

#[derive(Debug, Clone)]
pub struct DecodedAttachment {
    pub index: usize,
    pub file_name: String,
    pub content_type: String,
    pub declared_length: i64,
    pub bytes: Bytes,
}

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("attachment '{file_name}' is not valid base64: {source}")]
    Decode {
        index: usize,
        file_name: String,
        source: base64::DecodeError,
    },

    #[error("attachment '{file_name}' could not be uploaded: {source}")]
    Upload {
        index: usize,
        file_name: String,
        source: StorageError,
    },

    #[error("attachment '{file_name}' could not be recorded: {source}")]
    Record {
        index: usize,
        file_name: String,
        source: AppError,
    },

    #[error("attachment '{file_name}' task did not complete")]
    Aborted { index: usize, file_name: String },
}

impl AttachmentError {
    fn index(&self) -> usize {
        match self {
            AttachmentError::Decode { index, .. }
            | AttachmentError::Upload { index, .. }
            | AttachmentError::Record { index, .. }
            | AttachmentError::Aborted { index, .. } => *index,
        }
    }

    fn file_name(&self) -> &str {
        match self {
            AttachmentError::Decode { file_name, .. }
            | AttachmentError::Upload { file_name, .. }
            | AttachmentError::Record { file_name, .. }
            | AttachmentError::Aborted { file_name, .. } => file_name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedAttachment {
    pub index: usize,
    pub file_name: String,
    pub reason: String,
}

/// Which attachments of a message were stored and which were dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttachmentReport {
    pub stored: Vec<AttachmentRow>,
    pub failed: Vec<FailedAttachment>,
}

impl AttachmentReport {
    fn record_failure(&mut self, error: AttachmentError) {
        warn!(index = error.index(), file_name = error.file_name(), "{error}");
        self.failed.push(FailedAttachment {
            index: error.index(),
            file_name: error.file_name().to_string(),
            reason: error.to_string(),
        });
    }
}

/// Decodes every payload up front. Pure: no I/O, so it can run before classification.
pub fn extract(attachments: &[InboundAttachment]) -> Vec<Result<DecodedAttachment, AttachmentError>> {
    attachments
        .iter()
        .enumerate()
        .map(|(index, attachment)| {
            let file_name = match attachment.name.trim() {
                "" => format!("attachment-{}", index + 1),
                name => name.to_string(),
            };
            let cleaned: String = attachment
                .content
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            match STANDARD.decode(cleaned) {
                Ok(bytes) => Ok(DecodedAttachment {
                    index,
                    file_name,
                    content_type: match attachment.content_type.trim() {
                        "" => FALLBACK_CONTENT_TYPE.to_string(),
                        content_type => content_type.to_string(),
                    },
                    declared_length: attachment.content_length,
                    bytes: Bytes::from(bytes),
                }),
                Err(source) => Err(AttachmentError::Decode {
                    index,
                    file_name,
                    source,
                }),
            }
        })
        .collect()
}

fn sanitize_extension(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty()
        || candidate.len() > MAX_EXTENSION_LEN
        || !candidate.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(candidate.to_ascii_lowercase())
}

/// Extension from the file name, then the content-type subtype, then `bin`.
pub fn file_extension(file_name: &str, content_type: &str) -> String {
    file_name
        .rsplit_once('.')
        .and_then(|(stem, ext)| (!stem.is_empty()).then_some(ext))
        .and_then(sanitize_extension)
        .or_else(|| {
            content_type
                .split(';')
                .next()
                .and_then(|essence| essence.split_once('/'))
                .and_then(|(_, subtype)| sanitize_extension(subtype))
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// `attachments/<unix-millis>-<random>.<ext>`: time-ordered, unique across concurrent uploads.
pub fn storage_key(file_name: &str, content_type: &str, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{KEY_PREFIX}/{}-{}.{}",
        now.timestamp_millis(),
        &suffix[..12],
        file_extension(file_name, content_type)
    )
}

async fn store_one(
    objects: &dyn ObjectStore,
    records: &dyn AttachmentRepository,
    applicant_id: i64,
    attachment: DecodedAttachment,
) -> Result<(usize, AttachmentRow), AttachmentError> {
    let DecodedAttachment {
        index,
        file_name,
        content_type,
        declared_length,
        bytes,
    } = attachment;

    let size = bytes.len() as i64;
    if declared_length != size {
        warn!(
            applicant_id,
            file_name = %file_name,
            declared_length,
            size,
            "declared attachment length differs from decoded size"
        );
    }

    let key = storage_key(&file_name, &content_type, Utc::now());
    let file_url = match objects.put(&key, bytes, &content_type).await {
        Ok(url) => url,
        Err(source) => {
            return Err(AttachmentError::Upload {
                index,
                file_name,
                source,
            })
        }
    };

    records
        .insert(NewAttachment {
            applicant_id,
            file_url,
            file_name: file_name.clone(),
            content_type,
            size,
        })
        .await
        .map(|row| (index, row))
        .map_err(|source| AttachmentError::Record {
            index,
            file_name,
            source,
        })
}

/// Uploads extracted attachments for an applicant that already exists.
#[derive(Clone)]
pub struct AttachmentUploader {
    objects: Arc<dyn ObjectStore>,
    records: Arc<dyn AttachmentRepository>,
}

impl AttachmentUploader {
    pub fn new(objects: Arc<dyn ObjectStore>, records: Arc<dyn AttachmentRepository>) -> Self {
        Self { objects, records }
    }

    /// Runs one task per attachment and waits for all of them. Never fails:
    /// every problem ends up in `AttachmentReport::failed`.
    pub async fn upload_all(
        &self,
        applicant_id: i64,
        extracted: Vec<Result<DecodedAttachment, AttachmentError>>,
    ) -> AttachmentReport {
        let mut report = AttachmentReport::default();
        if extracted.is_empty() {
            return report;
        }

        let mut spawned = BTreeMap::new();
        let mut tasks = JoinSet::new();
        for item in extracted {
            match item {
                Ok(attachment) => {
                    spawned.insert(attachment.index, attachment.file_name.clone());
                    let objects = Arc::clone(&self.objects);
                    let records = Arc::clone(&self.records);
                    tasks.spawn(async move {
                        store_one(objects.as_ref(), records.as_ref(), applicant_id, attachment)
                            .await
                    });
                }
                Err(error) => report.record_failure(error),
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok((index, row))) => {
                    spawned.remove(&index);
                    report.stored.push(row);
                }
                Ok(Err(error)) => {
                    spawned.remove(&error.index());
                    report.record_failure(error);
                }
                Err(join_error) => warn!(applicant_id, "attachment task aborted: {join_error}"),
            }
        }

        // Whatever is left belonged to a task that panicked or was cancelled.
        for (index, file_name) in spawned {
            report.record_failure(AttachmentError::Aborted { index, file_name });
        }

        report.stored.sort_by_key(|row| row.id);
        report.failed.sort_by_key(|failure| failure.index);
        info!(
            applicant_id,
            stored = report.stored.len(),
            failed = report.failed.len(),
            "attachments processed"
        );
        report
    }
}
