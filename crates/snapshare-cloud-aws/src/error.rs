//! Amazon RDS provider error types

use aws_sdk_rds::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use snapshare_cloud::SnapshotError;
use thiserror::Error;

/// Error code RDS returns for an unknown snapshot identifier
const SNAPSHOT_NOT_FOUND_CODE: &str = "DBSnapshotNotFound";

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("RDS {operation} failed ({code}): {message}")]
    Api {
        operation: &'static str,
        code: String,
        message: String,
    },

    #[error("DB snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("RDS {operation} response did not include a DB snapshot")]
    MissingSnapshot { operation: &'static str },
}

impl AwsError {
    /// Convert an SDK failure, keeping the service error code when there is one
    pub fn from_sdk<E, R>(operation: &'static str, snapshot_id: &str, err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
        R: std::fmt::Debug + Send + Sync + 'static,
    {
        match err.code() {
            Some(SNAPSHOT_NOT_FOUND_CODE) => AwsError::SnapshotNotFound(snapshot_id.to_string()),
            code => AwsError::Api {
                operation,
                code: code.unwrap_or("unknown").to_string(),
                message: DisplayErrorContext(&err).to_string(),
            },
        }
    }
}

impl From<AwsError> for SnapshotError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::SnapshotNotFound(id) => SnapshotError::SnapshotNotFound(id),
            other => SnapshotError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_snapshot_not_found() {
        let err: SnapshotError = AwsError::SnapshotNotFound("mydb-to-be-copied".into()).into();
        assert_eq!(
            err,
            SnapshotError::SnapshotNotFound("mydb-to-be-copied".to_string())
        );
    }

    #[test]
    fn test_api_error_maps_to_api_error() {
        let err: SnapshotError = AwsError::Api {
            operation: "CopyDBSnapshot",
            code: "KMSKeyNotAccessibleFault".into(),
            message: "key disabled".into(),
        }
        .into();
        assert_eq!(
            err,
            SnapshotError::ApiError(
                "RDS CopyDBSnapshot failed (KMSKeyNotAccessibleFault): key disabled".to_string()
            )
        );
    }
}
