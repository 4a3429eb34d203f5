use aws_config::SdkConfig;
use aws_sdk_codepipeline::types::{ExecutionDetails, FailureDetails, FailureType};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_serverlessapplicationrepository::error::{
    DisplayErrorContext as SarErrorContext, ProvideErrorMetadata as SarErrorMetadata,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use sar_publish_core::contract::{ArtifactCredentials, JobOutcome, PublishSummary};
use sar_publish_core::error::PublishError;
use sar_publish_lambda::adapters::app_repository::{
    ApplicationRepository, CreateApplicationRequest, CreateApplicationVersionRequest,
    RepositoryError, UpdateApplicationRequest,
};
use sar_publish_lambda::adapters::artifact_store::ArtifactStore;
use sar_publish_lambda::adapters::job_status::{
    failure_message, success_summary_text, JobStatusReporter,
};
use sar_publish_lambda::config::{ArtifactSettings, PublishConfig};
use sar_publish_lambda::handlers::publish::handle_publish_event;
use serde_json::{json, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const ARTIFACT_CREDENTIALS_PROVIDER: &str = "codepipeline-artifact-credentials";

/// S3 client authenticated with one job's artifact credentials. It is built
/// inside a single `get_object` call and dropped, credentials included, when
/// that call returns.
struct JobScopedS3Client {
    client: aws_sdk_s3::Client,
}

impl JobScopedS3Client {
    fn new(base: &SdkConfig, credentials: &ArtifactCredentials) -> Self {
        let credentials = aws_sdk_s3::config::Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            Some(credentials.session_token.clone()),
            None,
            ARTIFACT_CREDENTIALS_PROVIDER,
        );
        let config = aws_sdk_s3::config::Builder::from(base)
            .credentials_provider(credentials)
            .build();
        Self {
            client: aws_sdk_s3::Client::from_conf(config),
        }
    }
}

struct S3ArtifactStore {
    sdk_config: SdkConfig,
}

impl ArtifactStore for S3ArtifactStore {
    fn get_object(
        &self,
        credentials: &ArtifactCredentials,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<u8>, PublishError> {
        let scoped = JobScopedS3Client::new(&self.sdk_config, credentials);
        let bucket = bucket.to_string();
        let key = key.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = scoped
                    .client
                    .get_object()
                    .bucket(&bucket)
                    .key(&key)
                    .send()
                    .await
                    .map_err(|error| {
                        let message = DisplayErrorContext(&error).to_string();
                        if error.code() == Some("AccessDenied") {
                            PublishError::StorageAccessDenied {
                                bucket: bucket.clone(),
                                key: key.clone(),
                                message,
                            }
                        } else {
                            PublishError::Storage {
                                bucket: bucket.clone(),
                                key: key.clone(),
                                message,
                            }
                        }
                    })?;

                output
                    .body
                    .collect()
                    .await
                    .map(|data| data.into_bytes().to_vec())
                    .map_err(|error| PublishError::Storage {
                        bucket: bucket.clone(),
                        key: key.clone(),
                        message: format!("failed to read object body: {error}"),
                    })
            })
        })
    }
}

struct SarApplicationRepository {
    client: aws_sdk_serverlessapplicationrepository::Client,
}

fn repository_error<E>(error: E) -> RepositoryError
where
    E: SarErrorMetadata + std::error::Error,
{
    let message = error
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| SarErrorContext(&error).to_string());
    RepositoryError::new(error.code(), message)
}

impl ApplicationRepository for SarApplicationRepository {
    fn create_application(
        &self,
        request: &CreateApplicationRequest,
    ) -> Result<String, RepositoryError> {
        let request = request.clone();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .create_application()
                    .name(request.name)
                    .description(request.description)
                    .author(request.author)
                    .set_spdx_license_id(request.spdx_license_id)
                    .set_license_url(request.license_url)
                    .set_readme_url(request.readme_url)
                    .set_labels(request.labels)
                    .set_home_page_url(request.home_page_url)
                    .set_semantic_version(request.semantic_version)
                    .set_source_code_url(request.source_code_url)
                    .template_body(request.template_body)
                    .send()
                    .await
                    .map_err(repository_error)?;

                output
                    .application_id()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        RepositoryError::new(None, "CreateApplication returned no ApplicationId")
                    })
            })
        })
    }

    fn update_application(
        &self,
        request: &UpdateApplicationRequest,
    ) -> Result<(), RepositoryError> {
        let request = request.clone();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .update_application()
                    .application_id(request.application_id)
                    .set_author(request.author)
                    .set_description(request.description)
                    .set_home_page_url(request.home_page_url)
                    .set_labels(request.labels)
                    .set_readme_url(request.readme_url)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(repository_error)
            })
        })
    }

    fn create_application_version(
        &self,
        request: &CreateApplicationVersionRequest,
    ) -> Result<(), RepositoryError> {
        let request = request.clone();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .create_application_version()
                    .application_id(request.application_id)
                    .semantic_version(request.semantic_version)
                    .set_source_code_url(request.source_code_url)
                    .template_body(request.template_body)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(repository_error)
            })
        })
    }
}

struct CodePipelineReporter {
    client: aws_sdk_codepipeline::Client,
}

impl JobStatusReporter for CodePipelineReporter {
    fn report_success(&self, job_id: &str, summary: &PublishSummary) -> Result<(), String> {
        let client = self.client.clone();
        let job_id = job_id.to_string();
        let details = ExecutionDetails::builder()
            .summary(success_summary_text(summary))
            .build();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_job_success_result()
                    .job_id(job_id)
                    .execution_details(details)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!(
                            "failed to put job success result: {}",
                            aws_sdk_codepipeline::error::DisplayErrorContext(&error)
                        )
                    })
            })
        })
    }

    fn report_failure(&self, job_id: &str, error: &PublishError) -> Result<(), String> {
        let client = self.client.clone();
        let job_id = job_id.to_string();
        let details = FailureDetails::builder()
            .r#type(FailureType::JobFailed)
            .message(failure_message(error))
            .build()
            .map_err(|error| format!("invalid failure details: {error}"))?;

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_job_failure_result()
                    .job_id(job_id)
                    .failure_details(details)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!(
                            "failed to put job failure result: {}",
                            aws_sdk_codepipeline::error::DisplayErrorContext(&error)
                        )
                    })
            })
        })
    }
}

struct RuntimeDependencies {
    settings: ArtifactSettings,
    artifact_store: S3ArtifactStore,
    repository: SarApplicationRepository,
    reporter: CodePipelineReporter,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    debug!(request_id = %event.context.request_id, "invocation received");

    let outcome = handle_publish_event(
        event.payload,
        &deps.settings,
        &deps.artifact_store,
        &deps.repository,
        &deps.reporter,
    )
    .map_err(|error| Error::from(error.to_string()))?;

    Ok(match outcome {
        JobOutcome::Succeeded(summary) => json!({
            "status": "succeeded",
            "application_id": summary.application_id,
            "actions": summary.actions,
        }),
        JobOutcome::Failed(error) => json!({
            "status": "failed",
            "error_kind": error.kind().as_str(),
            "message": error.to_string(),
        }),
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = PublishConfig::from_env().map_err(|error| Error::from(error.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_filter()))
        .with_target(false)
        .without_time()
        .init();

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        settings: config.artifacts,
        artifact_store: S3ArtifactStore {
            sdk_config: sdk_config.clone(),
        },
        repository: SarApplicationRepository {
            client: aws_sdk_serverlessapplicationrepository::Client::new(&sdk_config),
        },
        reporter: CodePipelineReporter {
            client: aws_sdk_codepipeline::Client::new(&sdk_config),
        },
    };

    let deps = &deps;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}
