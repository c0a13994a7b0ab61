//! Durable object storage for applicant files.
//!
//! `ObjectStore` is the seam the attachment uploader depends on; `S3ObjectStore`
//! is the production backend (any S3-compatible bucket, e.g. R2 or MinIO).

pub mod handlers;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload of '{key}' failed: {message}")]
    Upload { key: String, message: String },

    #[error("listing bucket failed: {0}")]
    List(String),
}

/// Summary of one stored object, as returned by `list_all`.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectDescriptor {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the object's public URL.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str)
        -> Result<String, StorageError>;

    /// Lists every object in the bucket.
    async fn list_all(&self) -> Result<Vec<ObjectDescriptor>, StorageError>;
}

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: String,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_url: String) -> Self {
        Self {
            client,
            bucket,
            public_url,
        }
    }
}

/// `<base>/<key>` with exactly one separating slash.
pub fn public_object_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        debug!(bucket = %self.bucket, key, size, "uploaded object");
        Ok(public_object_url(&self.public_url, key))
    }

    async fn list_all(&self) -> Result<Vec<ObjectDescriptor>, StorageError> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StorageError::List(e.to_string()))?;

            for object in page.contents() {
                objects.push(ObjectDescriptor {
                    key: object.key().unwrap_or_default().to_string(),
                    size: object.size().unwrap_or(0),
                    last_modified: object
                        .last_modified()
                        .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos())),
                });
            }

            match page.next_continuation_token() {
                Some(token) if page.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(objects)
    }
}
