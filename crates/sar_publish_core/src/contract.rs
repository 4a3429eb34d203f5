use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::PublishError;

pub const JOB_EVENT_KEY: &str = "CodePipeline.job";
pub const DEFAULT_ARTIFACT_NAME: &str = "PackagedTemplate";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodePipelineEvent {
    #[serde(rename = "CodePipeline.job")]
    pub job: PipelineJob,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineJob {
    pub id: String,
    #[serde(default)]
    pub account_id: Option<String>,
    pub data: JobData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobData {
    #[serde(default)]
    pub action_configuration: Option<Value>,
    #[serde(default)]
    pub input_artifacts: Vec<InputArtifact>,
    #[serde(default)]
    pub output_artifacts: Vec<InputArtifact>,
    pub artifact_credentials: ArtifactCredentials,
    #[serde(default)]
    pub continuation_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputArtifact {
    pub name: String,
    #[serde(default)]
    pub revision: Option<String>,
    pub location: ArtifactLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactLocation {
    #[serde(rename = "type", default)]
    pub location_type: Option<String>,
    pub s3_location: S3Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct S3Location {
    pub bucket_name: String,
    pub object_key: String,
}

/// Temporary, job-scoped credentials for the pipeline artifact bucket.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
}

impl fmt::Debug for ArtifactCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactCredentials")
            .field("access_key_id", &crate::redaction::HIDDEN_VALUE)
            .field("secret_access_key", &crate::redaction::HIDDEN_VALUE)
            .field("session_token", &crate::redaction::HIDDEN_VALUE)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub name: String,
    pub bucket: String,
    pub key: String,
}

impl From<&InputArtifact> for ArtifactDescriptor {
    fn from(artifact: &InputArtifact) -> Self {
        Self {
            name: artifact.name.clone(),
            bucket: artifact.location.s3_location.bucket_name.clone(),
            key: artifact.location.s3_location.object_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishAction {
    CreateApplication,
    UpdateApplication,
    CreateApplicationVersion,
}

impl PublishAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateApplication => "CREATE_APPLICATION",
            Self::UpdateApplication => "UPDATE_APPLICATION",
            Self::CreateApplicationVersion => "CREATE_APPLICATION_VERSION",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublishSummary {
    pub application_id: String,
    pub actions: Vec<PublishAction>,
    pub details: serde_json::Map<String, Value>,
}

#[derive(Debug)]
pub enum JobOutcome {
    Succeeded(PublishSummary),
    Failed(PublishError),
}

/// Reads the job id straight from the raw event so failures can still be
/// reported when the rest of the payload does not match the contract.
pub fn job_id_from_event(event: &Value) -> Option<&str> {
    event
        .get(JOB_EVENT_KEY)
        .and_then(|job| job.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
}

pub fn template_fingerprint(template: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(template.as_bytes());
    format!("{:x}", hasher.finalize())
}
