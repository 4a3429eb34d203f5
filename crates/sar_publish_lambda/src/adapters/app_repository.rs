use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateApplicationRequest {
    pub name: String,
    pub description: String,
    pub author: String,
    pub spdx_license_id: Option<String>,
    pub license_url: Option<String>,
    pub readme_url: Option<String>,
    pub labels: Option<Vec<String>>,
    pub home_page_url: Option<String>,
    pub semantic_version: Option<String>,
    pub source_code_url: Option<String>,
    pub template_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateApplicationRequest {
    pub application_id: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub home_page_url: Option<String>,
    pub labels: Option<Vec<String>>,
    pub readme_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateApplicationVersionRequest {
    pub application_id: String,
    pub semantic_version: String,
    pub source_code_url: Option<String>,
    pub template_body: String,
}

/// Service error surfaced by the application repository, keyed by the
/// service's error code (for example `ConflictException`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    pub code: Option<String>,
    pub message: String,
}

impl RepositoryError {
    pub const CONFLICT: &'static str = "ConflictException";

    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.code.as_deref() == Some(Self::CONFLICT)
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// The Serverless Application Repository operations used for publishing.
pub trait ApplicationRepository {
    /// Returns the id (ARN) of the created application.
    fn create_application(&self, request: &CreateApplicationRequest)
        -> Result<String, RepositoryError>;

    fn update_application(&self, request: &UpdateApplicationRequest)
        -> Result<(), RepositoryError>;

    fn create_application_version(
        &self,
        request: &CreateApplicationVersionRequest,
    ) -> Result<(), RepositoryError>;
}
