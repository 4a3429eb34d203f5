use sar_publish_core::contract::ArtifactCredentials;
use sar_publish_core::error::PublishError;

/// Read access to the pipeline artifact bucket.
///
/// Implementations must authenticate with the credentials passed to each call
/// and must not keep them once the call returns.
pub trait ArtifactStore {
    fn get_object(
        &self,
        credentials: &ArtifactCredentials,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<u8>, PublishError>;
}
