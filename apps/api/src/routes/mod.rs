pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::catalog::handlers as jobs;
use crate::intake::handlers as intake;
use crate::state::AppState;
use crate::storage::handlers as storage;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Mail-provider webhook
        .route(
            "/api/v1/inbound/email",
            post(intake::handle_inbound_email)
                .layer(DefaultBodyLimit::max(state.max_inbound_body_bytes)),
        )
        // Job catalog
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get_job)
                .put(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route(
            "/api/v1/jobs/:id/qualifications",
            post(jobs::handle_generate_qualifications),
        )
        .route(
            "/api/v1/jobs/:id/applicants",
            get(intake::handle_list_applicants),
        )
        // Applicant review
        .route(
            "/api/v1/applicants/:id/status",
            patch(intake::handle_set_status),
        )
        .route("/api/v1/storage/objects", get(storage::handle_list_objects))
        .with_state(state)
}
