//! Amazon RDS provider for snapshare
//!
//! Implements [`snapshare_cloud::SnapshotProvider`] on top of `aws-sdk-rds`.
//!
//! # Requirements
//!
//! - Credentials resolvable by the AWS default provider chain
//!   (environment, shared config/credentials files, IMDS, ...)
//! - `rds:CreateDBSnapshot`, `rds:CopyDBSnapshot`, `rds:DescribeDBSnapshots`,
//!   `rds:ModifyDBSnapshotAttribute` and use of the target KMS key
//!
//! # Example
//!
//! ```ignore
//! use snapshare_cloud_aws::{AwsOptions, RdsSnapshotProvider};
//! use snapshare_cloud::{PipelineConfig, SharePipeline, ShareRequest};
//!
//! let provider = RdsSnapshotProvider::from_env(&AwsOptions::default()).await;
//! let report = SharePipeline::new(&provider, PipelineConfig::default())
//!     .run(&ShareRequest::new("mydb", "arn:aws:kms:...:key/abc", "112233"))
//!     .await;
//! ```

pub mod error;
pub mod provider;

pub use error::{AwsError, Result};
pub use provider::{AwsOptions, RdsSnapshotProvider};
