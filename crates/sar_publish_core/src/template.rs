//! SAR application metadata carried in a packaged SAM template.
//!
//! The metadata lives under `Metadata.AWS::ServerlessRepo::Application`. The
//! template itself is parsed as YAML, which also covers JSON templates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_yaml::Value as YamlValue;

use crate::contract::PublishAction;
use crate::error::PublishError;

pub const APPLICATION_METADATA_KEY: &str = "AWS::ServerlessRepo::Application";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ApplicationMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub spdx_license_id: Option<String>,
    #[serde(default)]
    pub license_url: Option<String>,
    #[serde(default)]
    pub readme_url: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub home_page_url: Option<String>,
    #[serde(default)]
    pub semantic_version: Option<String>,
    #[serde(default)]
    pub source_code_url: Option<String>,
}

/// Metadata that passed the checks required to create an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMetadata {
    pub name: String,
    pub description: String,
    pub author: String,
    pub metadata: ApplicationMetadata,
}

pub fn parse_application_metadata(template: &str) -> Result<ValidatedMetadata, PublishError> {
    let document: YamlValue = serde_yaml::from_str(template).map_err(|error| {
        PublishError::InvalidTemplate(format!("template is not valid YAML or JSON: {error}"))
    })?;

    let section = document
        .get("Metadata")
        .and_then(|metadata| metadata.get(APPLICATION_METADATA_KEY))
        .ok_or_else(|| {
            PublishError::InvalidTemplate(format!(
                "missing Metadata section '{APPLICATION_METADATA_KEY}'"
            ))
        })?;

    let metadata: ApplicationMetadata = serde_yaml::from_value(section.clone()).map_err(|error| {
        PublishError::InvalidTemplate(format!(
            "malformed '{APPLICATION_METADATA_KEY}' metadata: {error}"
        ))
    })?;

    validate(metadata)
}

fn validate(metadata: ApplicationMetadata) -> Result<ValidatedMetadata, PublishError> {
    let mut missing = Vec::new();
    let name = required(&metadata.name, "Name", &mut missing);
    let description = required(&metadata.description, "Description", &mut missing);
    let author = required(&metadata.author, "Author", &mut missing);

    match (name, description, author) {
        (Some(name), Some(description), Some(author)) => Ok(ValidatedMetadata {
            name,
            description,
            author,
            metadata,
        }),
        _ => Err(PublishError::InvalidTemplate(format!(
            "required application metadata properties not provided: {}",
            missing.join(", ")
        ))),
    }
}

fn required(
    value: &Option<String>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Some(text.to_string()),
        _ => {
            missing.push(field);
            None
        }
    }
}

/// Removes the application metadata from the template body sent to the
/// repository. `Metadata` is dropped entirely when nothing else is left in it.
pub fn strip_application_metadata(template: &str) -> Result<String, PublishError> {
    let mut document: YamlValue = serde_yaml::from_str(template).map_err(|error| {
        PublishError::InvalidTemplate(format!("template is not valid YAML or JSON: {error}"))
    })?;

    if let Some(root) = document.as_mapping_mut() {
        let now_empty = match root.get_mut("Metadata").and_then(YamlValue::as_mapping_mut) {
            Some(metadata) => {
                metadata.remove(APPLICATION_METADATA_KEY);
                metadata.is_empty()
            }
            None => false,
        };
        if now_empty {
            root.remove("Metadata");
        }
    }

    serde_yaml::to_string(&document).map_err(|error| {
        PublishError::InvalidTemplate(format!("failed to render template: {error}"))
    })
}

/// Metadata echoed back in the publish summary. A created application reports
/// everything it was created with; an update only reports what was sent.
pub fn publish_details(
    actions: &[PublishAction],
    metadata: &ApplicationMetadata,
) -> Map<String, Value> {
    let mut details = Map::new();

    if actions.contains(&PublishAction::CreateApplication) {
        insert_text(&mut details, "Name", &metadata.name);
        insert_text(&mut details, "Description", &metadata.description);
        insert_text(&mut details, "Author", &metadata.author);
        insert_text(&mut details, "SpdxLicenseId", &metadata.spdx_license_id);
        insert_text(&mut details, "LicenseUrl", &metadata.license_url);
        insert_text(&mut details, "ReadmeUrl", &metadata.readme_url);
        insert_labels(&mut details, &metadata.labels);
        insert_text(&mut details, "HomePageUrl", &metadata.home_page_url);
        insert_text(&mut details, "SemanticVersion", &metadata.semantic_version);
        insert_text(&mut details, "SourceCodeUrl", &metadata.source_code_url);
        return details;
    }

    if actions.contains(&PublishAction::UpdateApplication) {
        insert_text(&mut details, "Description", &metadata.description);
        insert_text(&mut details, "Author", &metadata.author);
        insert_text(&mut details, "ReadmeUrl", &metadata.readme_url);
        insert_labels(&mut details, &metadata.labels);
        insert_text(&mut details, "HomePageUrl", &metadata.home_page_url);
    }

    if actions.contains(&PublishAction::CreateApplicationVersion) {
        insert_text(&mut details, "SemanticVersion", &metadata.semantic_version);
        insert_text(&mut details, "SourceCodeUrl", &metadata.source_code_url);
    }

    details
}

fn insert_text(details: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        details.insert(key.to_string(), Value::from(value.as_str()));
    }
}

fn insert_labels(details: &mut Map<String, Value>, labels: &Option<Vec<String>>) {
    if let Some(labels) = labels {
        details.insert("Labels".to_string(), Value::from(labels.clone()));
    }
}

/// Pulls the application ARN out of the repository's "already exists"
/// conflict message.
pub fn parse_application_id(message: &str) -> Option<String> {
    message
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !is_arn_char(c)))
        .find(|token| {
            token.starts_with("arn:")
                && token.contains(":serverlessrepo:")
                && token.contains(":applications/")
        })
        .map(str::to_string)
}

fn is_arn_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ':' | '/' | '-' | '_')
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    use super::*;

    const TEMPLATE: &str = r#"
AWSTemplateFormatVersion: '2010-09-09'
Transform: AWS::Serverless-2016-10-31
Metadata:
  AWS::ServerlessRepo::Application:
    Name: sample-app-name
    Description: sample-description
    Author: sample-author
    SpdxLicenseId: MIT
    LicenseUrl: s3://bucket/LICENSE
    ReadmeUrl: s3://bucket/README.md
    Labels: ['codepipeline', 'sar']
    HomePageUrl: https://github.com/
    SemanticVersion: 1.0.0
    SourceCodeUrl: https://github.com/
Resources:
  Function:
    Type: AWS::Serverless::Function
    Properties:
      CodeUri: s3://bucket/code.zip
      Handler: handler.publish
      Runtime: provided.al2023
      Environment:
        Variables:
          TABLE: !Ref Table
          ARN: !GetAtt Table.Arn
  Table:
    Type: AWS::Serverless::SimpleTable
"#;

    #[test]
    fn reads_metadata_from_template_with_intrinsic_tags() {
        let validated = parse_application_metadata(TEMPLATE).expect("metadata should parse");

        assert_eq!(validated.name, "sample-app-name");
        assert_eq!(validated.author, "sample-author");
        assert_eq!(validated.metadata.semantic_version.as_deref(), Some("1.0.0"));
        assert_eq!(
            validated.metadata.labels,
            Some(vec!["codepipeline".to_string(), "sar".to_string()])
        );
    }

    #[test]
    fn reads_metadata_from_json_template() {
        let template = r#"{
            "Metadata": {
                "AWS::ServerlessRepo::Application": {
                    "Name": "json-app",
                    "Description": "from json",
                    "Author": "someone"
                }
            },
            "Resources": {}
        }"#;

        let validated = parse_application_metadata(template).expect("metadata should parse");
        assert_eq!(validated.name, "json-app");
        assert_eq!(validated.metadata.semantic_version, None);
    }

    #[test]
    fn rejects_template_without_metadata_section() {
        let error = parse_application_metadata("Resources: {}\n").expect_err("should fail");
        assert_eq!(error.kind(), ErrorKind::InvalidTemplate);
        assert!(error.to_string().contains(APPLICATION_METADATA_KEY));
    }

    #[test]
    fn lists_every_missing_required_field() {
        let template = "Metadata:\n  AWS::ServerlessRepo::Application:\n    Name: only-name\n    Author: '  '\n";

        let error = parse_application_metadata(template).expect_err("should fail");
        let message = error.to_string();
        assert!(message.contains("Description"));
        assert!(message.contains("Author"));
        assert!(!message.contains("Name,"));
    }

    #[test]
    fn rejects_unparseable_template() {
        let error = parse_application_metadata("Metadata: [unterminated").expect_err("should fail");
        assert_eq!(error.kind(), ErrorKind::InvalidTemplate);
    }

    #[test]
    fn create_details_include_all_present_fields() {
        let validated = parse_application_metadata(TEMPLATE).expect("metadata should parse");
        let details = publish_details(&[PublishAction::CreateApplication], &validated.metadata);

        assert_eq!(details["Name"], "sample-app-name");
        assert_eq!(details["SpdxLicenseId"], "MIT");
        assert_eq!(details["SemanticVersion"], "1.0.0");
        assert_eq!(details.len(), 10);
    }

    #[test]
    fn update_details_only_include_updatable_fields() {
        let validated = parse_application_metadata(TEMPLATE).expect("metadata should parse");

        let details = publish_details(&[PublishAction::UpdateApplication], &validated.metadata);
        assert!(details.contains_key("Description"));
        assert!(!details.contains_key("Name"));
        assert!(!details.contains_key("SemanticVersion"));

        let details = publish_details(
            &[
                PublishAction::UpdateApplication,
                PublishAction::CreateApplicationVersion,
            ],
            &validated.metadata,
        );
        assert_eq!(details["SemanticVersion"], "1.0.0");
        assert_eq!(details["SourceCodeUrl"], "https://github.com/");
    }

    #[test]
    fn stripped_template_keeps_resources_and_other_metadata() {
        let template = TEMPLATE.replace(
            "Metadata:\n",
            "Metadata:\n  AWS::CloudFormation::Interface:\n    ParameterGroups: []\n",
        );

        let stripped = strip_application_metadata(&template).expect("template should render");
        let document: YamlValue = serde_yaml::from_str(&stripped).expect("stripped is yaml");

        assert!(!stripped.contains(APPLICATION_METADATA_KEY));
        assert!(document["Metadata"]
            .get("AWS::CloudFormation::Interface")
            .is_some());
        assert!(stripped.contains("!Ref"));
        assert_eq!(
            document["Resources"]["Table"]["Type"],
            YamlValue::from("AWS::Serverless::SimpleTable")
        );
    }

    #[test]
    fn stripping_drops_metadata_left_empty() {
        let stripped = strip_application_metadata(TEMPLATE).expect("template should render");
        let document: YamlValue = serde_yaml::from_str(&stripped).expect("stripped is yaml");

        assert!(document.get("Metadata").is_none());
        assert_eq!(
            document["Transform"],
            YamlValue::from("AWS::Serverless-2016-10-31")
        );
    }

    #[test]
    fn parses_application_id_from_conflict_message() {
        let message = "Application with id arn:aws:serverlessrepo:us-east-1:123456789012:applications/my-sam-app already exists.";
        assert_eq!(
            parse_application_id(message).as_deref(),
            Some("arn:aws:serverlessrepo:us-east-1:123456789012:applications/my-sam-app")
        );
        assert_eq!(parse_application_id("Application already exists."), None);
    }
}
