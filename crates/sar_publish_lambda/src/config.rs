use sar_publish_core::archive::ArtifactFormat;
use sar_publish_core::artifacts::LocatorPolicy;
use sar_publish_core::contract::DEFAULT_ARTIFACT_NAME;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
pub const ARTIFACT_NAME_VAR: &str = "ARTIFACT_NAME";
pub const ARTIFACT_SELECTION_VAR: &str = "ARTIFACT_SELECTION";
pub const ARTIFACT_FORMAT_VAR: &str = "ARTIFACT_FORMAT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
    #[error("{ARTIFACT_NAME_VAR} cannot be empty")]
    EmptyArtifactName,
    #[error("Invalid {ARTIFACT_SELECTION_VAR} '{0}' (expected by_name or exactly_one)")]
    InvalidSelection(String),
    #[error("Invalid {ARTIFACT_FORMAT_VAR} '{0}' (expected zip or raw)")]
    InvalidFormat(String),
}

/// How the template artifact is located and decoded for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSettings {
    pub artifact_name: String,
    pub locator: LocatorPolicy,
    pub format: ArtifactFormat,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            locator: LocatorPolicy::default(),
            format: ArtifactFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    pub log_level: LevelFilter,
    pub artifacts: ArtifactSettings,
}

impl PublishConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(raw) => parse_log_level(&raw)?,
            None => LevelFilter::INFO,
        };

        let artifact_name = match lookup(ARTIFACT_NAME_VAR) {
            Some(raw) if raw.trim().is_empty() => return Err(ConfigError::EmptyArtifactName),
            Some(raw) => raw.trim().to_string(),
            None => DEFAULT_ARTIFACT_NAME.to_string(),
        };

        let locator = match lookup(ARTIFACT_SELECTION_VAR) {
            Some(raw) => LocatorPolicy::parse(&raw).ok_or(ConfigError::InvalidSelection(raw))?,
            None => LocatorPolicy::default(),
        };

        let format = match lookup(ARTIFACT_FORMAT_VAR) {
            Some(raw) => ArtifactFormat::parse(&raw).ok_or(ConfigError::InvalidFormat(raw))?,
            None => ArtifactFormat::default(),
        };

        Ok(Self {
            log_level,
            artifacts: ArtifactSettings {
                artifact_name,
                locator,
                format,
            },
        })
    }

    /// Filter directives for the tracing subscriber. AWS SDK internals stay at
    /// `warn` unless the handler itself is traced more verbosely.
    pub fn log_filter(&self) -> String {
        let sdk_level = if self.log_level > LevelFilter::DEBUG {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN.min(self.log_level)
        };
        format!(
            "{},aws_config={sdk_level},aws_smithy_runtime={sdk_level}",
            self.log_level
        )
        .to_ascii_lowercase()
    }
}

fn parse_log_level(raw: &str) -> Result<LevelFilter, ConfigError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Ok(LevelFilter::TRACE),
        "DEBUG" => Ok(LevelFilter::DEBUG),
        "INFO" => Ok(LevelFilter::INFO),
        "WARN" | "WARNING" => Ok(LevelFilter::WARN),
        "ERROR" | "CRITICAL" => Ok(LevelFilter::ERROR),
        "OFF" => Ok(LevelFilter::OFF),
        _ => Err(ConfigError::InvalidLogLevel(raw.to_string())),
    }
}
