use sar_publish_core::archive::decode_artifact;
use sar_publish_core::artifacts::locate_artifact;
use sar_publish_core::contract::PipelineJob;
use sar_publish_core::error::PublishError;
use tracing::info;

use crate::adapters::artifact_store::ArtifactStore;
use crate::config::ArtifactSettings;

/// Locates the template artifact of a job, reads it once with the job's
/// artifact credentials and decodes it to template text.
pub fn fetch_template(
    job: &PipelineJob,
    settings: &ArtifactSettings,
    store: &impl ArtifactStore,
) -> Result<String, PublishError> {
    let descriptor = locate_artifact(
        &job.data.input_artifacts,
        &settings.artifact_name,
        settings.locator,
    )?;

    let body = store.get_object(
        &job.data.artifact_credentials,
        &descriptor.bucket,
        &descriptor.key,
    )?;
    info!(
        job_id = %job.id,
        bucket = %descriptor.bucket,
        key = %descriptor.key,
        bytes = body.len(),
        "artifact fetched"
    );

    decode_artifact(&body, settings.format)
}
