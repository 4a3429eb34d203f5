//! AWS-oriented adapters and handlers for the SAR publish pipeline action.
//!
//! This crate owns runtime integration details (the Lambda handler, S3,
//! Serverless Application Repository and CodePipeline adapters) on top of the
//! AWS-free primitives in `sar_publish_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
