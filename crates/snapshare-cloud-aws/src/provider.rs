//! Amazon RDS provider implementation

use crate::error::AwsError;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_rds::Client;
use aws_sdk_rds::types::DbSnapshot;
use snapshare_cloud::{
    CopySnapshotRequest, RESTORE_ATTRIBUTE, SnapshotInfo, SnapshotProvider, SnapshotStatus,
};

/// Client construction options; unset fields fall back to the default chain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AwsOptions {
    pub region: Option<String>,
    pub profile: Option<String>,
}

/// Amazon RDS snapshot provider
pub struct RdsSnapshotProvider {
    client: Client,
}

impl RdsSnapshotProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the AWS default configuration chain
    pub async fn from_env(options: &AwsOptions) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &options.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &options.profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        tracing::debug!(region = ?config.region(), "loaded AWS configuration");
        Self::new(Client::new(&config))
    }
}

/// Convert an RDS snapshot description
///
/// `requested_id` is used when the response omits the identifier.
pub(crate) fn snapshot_info(snapshot: &DbSnapshot, requested_id: &str) -> SnapshotInfo {
    let status = snapshot
        .status()
        .map(SnapshotStatus::parse)
        .unwrap_or_else(|| SnapshotStatus::Other("unknown".to_string()));

    SnapshotInfo {
        identifier: snapshot
            .db_snapshot_identifier()
            .unwrap_or(requested_id)
            .to_string(),
        arn: snapshot.db_snapshot_arn().map(str::to_string),
        status,
    }
}

#[async_trait]
impl SnapshotProvider for RdsSnapshotProvider {
    fn name(&self) -> &str {
        "aws-rds"
    }

    async fn create_snapshot(
        &self,
        instance_id: &str,
        snapshot_id: &str,
    ) -> snapshare_cloud::Result<SnapshotInfo> {
        const OPERATION: &str = "CreateDBSnapshot";
        tracing::debug!(instance_id, snapshot_id, "calling {}", OPERATION);

        let output = self
            .client
            .create_db_snapshot()
            .db_instance_identifier(instance_id)
            .db_snapshot_identifier(snapshot_id)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(OPERATION, snapshot_id, e))?;

        let snapshot = output
            .db_snapshot()
            .ok_or(AwsError::MissingSnapshot {
                operation: OPERATION,
            })?;
        Ok(snapshot_info(snapshot, snapshot_id))
    }

    async fn copy_snapshot(
        &self,
        request: &CopySnapshotRequest,
    ) -> snapshare_cloud::Result<SnapshotInfo> {
        const OPERATION: &str = "CopyDBSnapshot";
        tracing::debug!(
            source = %request.source_snapshot,
            target = %request.target_snapshot_id,
            "calling {}",
            OPERATION
        );

        let output = self
            .client
            .copy_db_snapshot()
            .source_db_snapshot_identifier(&request.source_snapshot)
            .target_db_snapshot_identifier(&request.target_snapshot_id)
            .kms_key_id(&request.kms_key_id)
            .copy_tags(request.copy_tags)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(OPERATION, &request.target_snapshot_id, e))?;

        let snapshot = output
            .db_snapshot()
            .ok_or(AwsError::MissingSnapshot {
                operation: OPERATION,
            })?;
        Ok(snapshot_info(snapshot, &request.target_snapshot_id))
    }

    async fn describe_snapshot(&self, snapshot_id: &str) -> snapshare_cloud::Result<SnapshotInfo> {
        const OPERATION: &str = "DescribeDBSnapshots";

        let output = self
            .client
            .describe_db_snapshots()
            .db_snapshot_identifier(snapshot_id)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(OPERATION, snapshot_id, e))?;

        let snapshot = output
            .db_snapshots()
            .first()
            .ok_or_else(|| AwsError::SnapshotNotFound(snapshot_id.to_string()))?;
        Ok(snapshot_info(snapshot, snapshot_id))
    }

    async fn share_snapshot(&self, snapshot_id: &str, account_id: &str) -> snapshare_cloud::Result<()> {
        const OPERATION: &str = "ModifyDBSnapshotAttribute";
        tracing::debug!(snapshot_id, account_id, "calling {}", OPERATION);

        self.client
            .modify_db_snapshot_attribute()
            .db_snapshot_identifier(snapshot_id)
            .attribute_name(RESTORE_ATTRIBUTE)
            .values_to_add(account_id)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(OPERATION, snapshot_id, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_info_from_description() {
        let snapshot = DbSnapshot::builder()
            .db_snapshot_identifier("mydb-to-be-copied")
            .db_snapshot_arn("arn:aws:rds:ap-southeast-1:111111111111:snapshot:mydb-to-be-copied")
            .status("creating")
            .build();

        let info = snapshot_info(&snapshot, "ignored");
        assert_eq!(info.identifier, "mydb-to-be-copied");
        assert_eq!(
            info.arn.as_deref(),
            Some("arn:aws:rds:ap-southeast-1:111111111111:snapshot:mydb-to-be-copied")
        );
        assert_eq!(info.status, SnapshotStatus::Creating);
    }

    #[test]
    fn test_snapshot_info_falls_back_to_requested_id() {
        let snapshot = DbSnapshot::builder().status("available").build();

        let info = snapshot_info(&snapshot, "mydb-to-be-shared");
        assert_eq!(info.identifier, "mydb-to-be-shared");
        assert_eq!(info.arn, None);
        assert!(info.is_available());
    }

    #[test]
    fn test_snapshot_info_without_status() {
        let snapshot = DbSnapshot::builder().db_snapshot_identifier("s").build();

        let info = snapshot_info(&snapshot, "s");
        assert_eq!(info.status, SnapshotStatus::Other("unknown".to_string()));
    }

    #[tokio::test]
    async fn test_from_env_uses_explicit_region() {
        let provider = RdsSnapshotProvider::from_env(&AwsOptions {
            region: Some("ap-southeast-1".to_string()),
            profile: None,
        })
        .await;

        assert_eq!(provider.name(), "aws-rds");
        assert_eq!(
            provider.client.config().region().map(|r| r.as_ref()),
            Some("ap-southeast-1")
        );
    }
}
