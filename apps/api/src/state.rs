use std::sync::Arc;

use crate::catalog::qualifications::QualificationDrafter;
use crate::catalog::JobCatalog;
use crate::intake::engine::IntakeEngine;
use crate::intake::repository::{ApplicantRepository, AttachmentRepository};
use crate::storage::ObjectStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every backend sits behind a trait object so tests can swap in in-memory versions.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn JobCatalog>,
    pub applicants: Arc<dyn ApplicantRepository>,
    pub attachments: Arc<dyn AttachmentRepository>,
    pub objects: Arc<dyn ObjectStore>,
    pub drafter: Arc<dyn QualificationDrafter>,
    pub intake: IntakeEngine,
    /// Body limit applied to the inbound email webhook only.
    pub max_inbound_body_bytes: usize,
}
