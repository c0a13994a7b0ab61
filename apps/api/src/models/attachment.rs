use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttachmentRow {
    pub id: i64,
    pub applicant_id: i64,
    pub file_url: String,
    pub file_name: String,
    pub content_type: String,
    /// Decoded payload length in bytes.
    pub size: i64,
    pub created_at: DateTime<Utc>,
}
