//! Applicant intake: classify an inbound application email against the job
//! catalog, upsert the applicant, and store any attached files.

pub mod attachments;
pub mod classifier;
pub mod engine;
pub mod handlers;
pub mod message;
pub mod prompts;
pub mod repository;
pub mod review;
pub mod status;
