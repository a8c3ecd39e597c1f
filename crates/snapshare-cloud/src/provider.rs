//! Snapshot provider trait definition

use crate::error::Result;
use async_trait::async_trait;

/// Attribute name that carries the restore access list of a snapshot
pub const RESTORE_ATTRIBUTE: &str = "restore";

/// Database snapshot provider abstraction
///
/// The production implementation talks to Amazon RDS; tests substitute a
/// recording mock. Every method is a single remote call, waiting for
/// availability is done by [`crate::waiter::wait_until_available`].
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Returns the provider name (e.g., "aws-rds")
    fn name(&self) -> &str;

    /// Request a new snapshot of `instance_id` named `snapshot_id`
    async fn create_snapshot(&self, instance_id: &str, snapshot_id: &str) -> Result<SnapshotInfo>;

    /// Request a copy of an existing snapshot, re-encrypted with the given key
    async fn copy_snapshot(&self, request: &CopySnapshotRequest) -> Result<SnapshotInfo>;

    /// Describe a snapshot by identifier
    async fn describe_snapshot(&self, snapshot_id: &str) -> Result<SnapshotInfo>;

    /// Add `account_id` to the restore access list of a snapshot
    async fn share_snapshot(&self, snapshot_id: &str, account_id: &str) -> Result<()>;
}

/// Snapshot as reported by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotInfo {
    /// Snapshot identifier
    pub identifier: String,

    /// Snapshot ARN, when the provider reports one
    pub arn: Option<String>,

    /// Current status
    pub status: SnapshotStatus,
}

impl SnapshotInfo {
    pub fn new(identifier: impl Into<String>, status: SnapshotStatus) -> Self {
        Self {
            identifier: identifier.into(),
            arn: None,
            status,
        }
    }

    pub fn with_arn(mut self, arn: impl Into<String>) -> Self {
        self.arn = Some(arn.into());
        self
    }

    pub fn is_available(&self) -> bool {
        self.status == SnapshotStatus::Available
    }
}

/// Snapshot lifecycle status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotStatus {
    /// Snapshot is being created
    Creating,
    /// Snapshot can be copied, shared and restored
    Available,
    /// Terminal failure status that will never become available
    Failed(String),
    /// Any other transient status (copying, pending, ...)
    Other(String),
}

/// Provider statuses after which a snapshot never becomes available
const TERMINAL_FAILURE_STATUSES: &[&str] = &[
    "deleted",
    "deleting",
    "failed",
    "incompatible-restore",
    "incompatible-parameters",
];

impl SnapshotStatus {
    /// Parse a raw provider status string
    pub fn parse(status: &str) -> Self {
        let normalized = status.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "available" => SnapshotStatus::Available,
            "creating" => SnapshotStatus::Creating,
            s if TERMINAL_FAILURE_STATUSES.contains(&s) => SnapshotStatus::Failed(normalized),
            _ => SnapshotStatus::Other(normalized),
        }
    }

    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, SnapshotStatus::Failed(_))
    }
}

impl std::fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotStatus::Creating => write!(f, "creating"),
            SnapshotStatus::Available => write!(f, "available"),
            SnapshotStatus::Failed(s) | SnapshotStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Parameters of a snapshot copy
#[derive(Debug, Clone, PartialEq)]
pub struct CopySnapshotRequest {
    /// Source snapshot identifier or ARN
    pub source_snapshot: String,

    /// Identifier of the copy
    pub target_snapshot_id: String,

    /// KMS key the copy is encrypted with, passed through unmodified
    pub kms_key_id: String,

    /// Copy the source snapshot's tags onto the copy
    pub copy_tags: bool,
}

impl CopySnapshotRequest {
    pub fn new(
        source_snapshot: impl Into<String>,
        target_snapshot_id: impl Into<String>,
        kms_key_id: impl Into<String>,
    ) -> Self {
        Self {
            source_snapshot: source_snapshot.into(),
            target_snapshot_id: target_snapshot_id.into(),
            kms_key_id: kms_key_id.into(),
            copy_tags: true,
        }
    }
}
