pub mod app_repository;
pub mod artifact_store;
pub mod job_status;
