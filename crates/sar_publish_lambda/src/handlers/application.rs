use sar_publish_core::contract::{PublishAction, PublishSummary};
use sar_publish_core::error::PublishError;
use sar_publish_core::template::{
    parse_application_id, parse_application_metadata, publish_details,
    strip_application_metadata, ValidatedMetadata,
};
use tracing::{debug, info};

use crate::adapters::app_repository::{
    ApplicationRepository, CreateApplicationRequest, CreateApplicationVersionRequest,
    RepositoryError, UpdateApplicationRequest,
};

/// Publishes a packaged template to the application repository.
///
/// A new application is created from the template metadata. When the
/// application already exists it is updated instead, and a new version is
/// created if the metadata names a `SemanticVersion` that is not published yet.
/// The application metadata itself is not part of the published template body.
pub fn publish_application(
    template: &str,
    repository: &impl ApplicationRepository,
) -> Result<PublishSummary, PublishError> {
    let validated = parse_application_metadata(template)?;
    let body = strip_application_metadata(template)?;
    debug!(application = %validated.name, "creating application");

    let (application_id, actions) =
        match repository.create_application(&create_request(&validated, &body)) {
            Ok(application_id) => (application_id, vec![PublishAction::CreateApplication]),
            Err(error) if error.is_conflict() => {
                let application_id = parse_application_id(&error.message).ok_or_else(|| {
                    PublishError::PublishRejected {
                        code: error.code.clone(),
                        message: format!(
                            "application already exists but its id could not be read: {}",
                            error.message
                        ),
                    }
                })?;
                info!(application_id = %application_id, "application exists, updating");
                let actions = update_existing(&application_id, &validated, &body, repository)?;
                (application_id, actions)
            }
            Err(error) => return Err(rejected(error)),
        };

    Ok(PublishSummary {
        application_id,
        details: publish_details(&actions, &validated.metadata),
        actions,
    })
}

fn update_existing(
    application_id: &str,
    validated: &ValidatedMetadata,
    template: &str,
    repository: &impl ApplicationRepository,
) -> Result<Vec<PublishAction>, PublishError> {
    let metadata = &validated.metadata;
    repository
        .update_application(&UpdateApplicationRequest {
            application_id: application_id.to_string(),
            author: Some(validated.author.clone()),
            description: Some(validated.description.clone()),
            home_page_url: metadata.home_page_url.clone(),
            labels: metadata.labels.clone(),
            readme_url: metadata.readme_url.clone(),
        })
        .map_err(rejected)?;
    let mut actions = vec![PublishAction::UpdateApplication];

    let Some(semantic_version) = metadata.semantic_version.clone() else {
        return Ok(actions);
    };

    let request = CreateApplicationVersionRequest {
        application_id: application_id.to_string(),
        semantic_version,
        source_code_url: metadata.source_code_url.clone(),
        template_body: template.to_string(),
    };
    match repository.create_application_version(&request) {
        Ok(()) => actions.push(PublishAction::CreateApplicationVersion),
        // The version is already published; republishing the same template is a no-op.
        Err(error) if error.is_conflict() => {
            info!(
                application_id = %application_id,
                semantic_version = %request.semantic_version,
                "application version already exists"
            );
        }
        Err(error) => return Err(rejected(error)),
    }

    Ok(actions)
}

fn create_request(validated: &ValidatedMetadata, template: &str) -> CreateApplicationRequest {
    let metadata = &validated.metadata;
    CreateApplicationRequest {
        name: validated.name.clone(),
        description: validated.description.clone(),
        author: validated.author.clone(),
        spdx_license_id: metadata.spdx_license_id.clone(),
        license_url: metadata.license_url.clone(),
        readme_url: metadata.readme_url.clone(),
        labels: metadata.labels.clone(),
        home_page_url: metadata.home_page_url.clone(),
        semantic_version: metadata.semantic_version.clone(),
        source_code_url: metadata.source_code_url.clone(),
        template_body: template.to_string(),
    }
}

fn rejected(error: RepositoryError) -> PublishError {
    PublishError::PublishRejected {
        message: error.to_string(),
        code: error.code,
    }
}
