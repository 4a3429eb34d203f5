use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidEvent,
    ArtifactNotFound,
    StorageAccessDenied,
    Storage,
    ArchiveFormat,
    InvalidTemplate,
    PublishRejected,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidEvent => "invalid_event",
            Self::ArtifactNotFound => "artifact_not_found",
            Self::StorageAccessDenied => "storage_access_denied",
            Self::Storage => "storage_error",
            Self::ArchiveFormat => "archive_format",
            Self::InvalidTemplate => "invalid_template",
            Self::PublishRejected => "publish_rejected",
        }
    }
}

/// Every failure that ends up in a CodePipeline failure report.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Invalid CodePipeline job event: {0}")]
    InvalidEvent(String),

    #[error("Unable to find the artifact with name {name}")]
    ArtifactNotFound { name: String },

    #[error(
        "Unable to find the artifact with name {name}: expected exactly one input artifact, found {found}"
    )]
    ArtifactCountMismatch { name: String, found: usize },

    #[error("Access denied reading s3://{bucket}/{key}: {message}")]
    StorageAccessDenied {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Failed to read s3://{bucket}/{key}: {message}")]
    Storage {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Unexpected artifact archive structure: {0}")]
    ArchiveFormat(String),

    #[error("Invalid packaged template: {0}")]
    InvalidTemplate(String),

    #[error("{message}")]
    PublishRejected {
        code: Option<String>,
        message: String,
    },
}

impl PublishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidEvent(_) => ErrorKind::InvalidEvent,
            Self::ArtifactNotFound { .. } | Self::ArtifactCountMismatch { .. } => {
                ErrorKind::ArtifactNotFound
            }
            Self::StorageAccessDenied { .. } => ErrorKind::StorageAccessDenied,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::ArchiveFormat(_) => ErrorKind::ArchiveFormat,
            Self::InvalidTemplate(_) => ErrorKind::InvalidTemplate,
            Self::PublishRejected { .. } => ErrorKind::PublishRejected,
        }
    }
}
