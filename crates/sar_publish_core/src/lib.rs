//! Shared domain primitives for the SAR publish pipeline action.
//!
//! This crate owns the CodePipeline job contract, artifact selection,
//! credential redaction, artifact archive decoding and SAR template metadata.
//! It intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod archive;
pub mod artifacts;
pub mod contract;
pub mod error;
pub mod redaction;
pub mod template;
