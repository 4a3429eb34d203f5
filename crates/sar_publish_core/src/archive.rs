use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::PublishError;

/// How the bytes stored at the artifact location are turned into template
/// text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// CodePipeline artifact zip holding exactly one file.
    #[default]
    Zip,
    /// The object is the template itself.
    Raw,
}

impl ArtifactFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "zip" => Some(Self::Zip),
            "raw" | "text" => Some(Self::Raw),
            _ => None,
        }
    }
}

pub fn decode_artifact(bytes: &[u8], format: ArtifactFormat) -> Result<String, PublishError> {
    match format {
        ArtifactFormat::Zip => extract_single_entry(bytes),
        ArtifactFormat::Raw => decode_text(bytes.to_vec(), "artifact object"),
    }
}

/// Reads the only file entry of a zip archive. Directory entries are ignored;
/// any other number of file entries than one is rejected.
pub fn extract_single_entry(bytes: &[u8]) -> Result<String, PublishError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|error| PublishError::ArchiveFormat(format!("invalid zip archive: {error}")))?;

    let mut file_indices = Vec::new();
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(|error| {
            PublishError::ArchiveFormat(format!("unreadable zip entry {index}: {error}"))
        })?;
        if !entry.is_dir() {
            file_indices.push(index);
        }
    }

    let &[index] = file_indices.as_slice() else {
        return Err(PublishError::ArchiveFormat(format!(
            "expected exactly one file entry, found {}",
            file_indices.len()
        )));
    };

    let mut entry = archive.by_index(index).map_err(|error| {
        PublishError::ArchiveFormat(format!("unreadable zip entry {index}: {error}"))
    })?;
    let entry_name = entry.name().to_string();
    // The declared size comes from the archive headers and is not trusted.
    let mut contents = Vec::new();
    entry.read_to_end(&mut contents).map_err(|error| {
        PublishError::ArchiveFormat(format!("failed to inflate entry '{entry_name}': {error}"))
    })?;

    decode_text(contents, &entry_name)
}

fn decode_text(bytes: Vec<u8>, source: &str) -> Result<String, PublishError> {
    String::from_utf8(bytes).map_err(|error| {
        PublishError::ArchiveFormat(format!("{source} is not valid UTF-8: {error}"))
    })
}
