use crate::contract::{ArtifactDescriptor, InputArtifact};
use crate::error::PublishError;

/// How the expected artifact is picked out of a job's input artifacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocatorPolicy {
    /// First artifact carrying the expected name, in pipeline order.
    #[default]
    FirstByName,
    /// The action must be wired with exactly one input artifact, and it must
    /// carry the expected name.
    ExactlyOne,
}

impl LocatorPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "by_name" | "by-name" | "first_by_name" => Some(Self::FirstByName),
            "exactly_one" | "exactly-one" | "single" => Some(Self::ExactlyOne),
            _ => None,
        }
    }
}

pub fn locate_artifact(
    artifacts: &[InputArtifact],
    name: &str,
    policy: LocatorPolicy,
) -> Result<ArtifactDescriptor, PublishError> {
    if policy == LocatorPolicy::ExactlyOne && artifacts.len() != 1 {
        return Err(PublishError::ArtifactCountMismatch {
            name: name.to_string(),
            found: artifacts.len(),
        });
    }

    artifacts
        .iter()
        .find(|artifact| artifact.name == name)
        .map(ArtifactDescriptor::from)
        .ok_or_else(|| PublishError::ArtifactNotFound {
            name: name.to_string(),
        })
}
