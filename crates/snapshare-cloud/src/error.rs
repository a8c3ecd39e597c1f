//! Snapshot provider error types

use thiserror::Error;

/// Snapshot provider errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("Snapshot '{snapshot_id}' entered terminal status '{status}'")]
    SnapshotFailed { snapshot_id: String, status: String },

    #[error("Provider response is missing {field} for snapshot '{snapshot_id}'")]
    MissingField {
        snapshot_id: String,
        field: &'static str,
    },

    #[error("Timeout: snapshot '{snapshot_id}' was not available after {attempts} attempts")]
    Timeout { snapshot_id: String, attempts: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SnapshotError {
    /// Whether this error is a poll bound exhaustion
    pub fn is_timeout(&self) -> bool {
        matches!(self, SnapshotError::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = SnapshotError::Timeout {
            snapshot_id: "mydb-to-be-copied".to_string(),
            attempts: 3,
        };
        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "Timeout: snapshot 'mydb-to-be-copied' was not available after 3 attempts"
        );
        assert!(!SnapshotError::ApiError("denied".to_string()).is_timeout());
    }
}
