use sar_publish_core::contract::{
    job_id_from_event, template_fingerprint, CodePipelineEvent, JobOutcome, PipelineJob,
    PublishSummary,
};
use sar_publish_core::error::PublishError;
use sar_publish_core::redaction::redact_event;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::adapters::app_repository::ApplicationRepository;
use crate::adapters::artifact_store::ArtifactStore;
use crate::adapters::job_status::JobStatusReporter;
use crate::config::ArtifactSettings;
use crate::handlers::application::publish_application;
use crate::handlers::fetch::fetch_template;

/// Failures that cannot be reported back to the pipeline job.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid CodePipeline job event: {0}")]
    InvalidEvent(String),
    #[error("Failed to report job status for {job_id}: {message}")]
    StatusReport { job_id: String, message: String },
}

/// Runs one CodePipeline publish job end to end and reports exactly one
/// outcome for it.
pub fn handle_publish_event(
    event: Value,
    settings: &ArtifactSettings,
    store: &impl ArtifactStore,
    repository: &impl ApplicationRepository,
    reporter: &impl JobStatusReporter,
) -> Result<JobOutcome, HandlerError> {
    let job_id = job_id_from_event(&event)
        .map(str::to_string)
        .ok_or_else(|| HandlerError::InvalidEvent("missing CodePipeline.job id".to_string()))?;

    info!(
        job_id = %job_id,
        request = %redact_event(&event),
        "CodePipeline publish to SAR request"
    );

    let outcome = match run_job(event, settings, store, repository) {
        Ok(summary) => JobOutcome::Succeeded(summary),
        Err(failure) => JobOutcome::Failed(failure),
    };

    let reported = match &outcome {
        JobOutcome::Succeeded(summary) => {
            info!(
                job_id = %job_id,
                application_id = %summary.application_id,
                actions = ?summary.actions,
                "publish succeeded"
            );
            reporter.report_success(&job_id, summary)
        }
        JobOutcome::Failed(failure) => {
            error!(
                job_id = %job_id,
                error_kind = failure.kind().as_str(),
                "{failure}"
            );
            reporter.report_failure(&job_id, failure)
        }
    };

    reported.map_err(|message| HandlerError::StatusReport { job_id, message })?;
    Ok(outcome)
}

fn run_job(
    event: Value,
    settings: &ArtifactSettings,
    store: &impl ArtifactStore,
    repository: &impl ApplicationRepository,
) -> Result<PublishSummary, PublishError> {
    let event: CodePipelineEvent = serde_json::from_value(event)
        .map_err(|error| PublishError::InvalidEvent(error.to_string()))?;
    let job: PipelineJob = event.job;

    let template = fetch_template(&job, settings, store)?;
    info!(
        job_id = %job.id,
        template_sha256 = %template_fingerprint(&template),
        "Making API calls to AWS Serverless Application Repository"
    );

    publish_application(&template, repository)
}
