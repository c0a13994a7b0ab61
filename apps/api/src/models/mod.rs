pub mod applicant;
pub mod attachment;
pub mod job;
