use async_trait::async_trait;
use snapshare_cloud::{
    CopySnapshotRequest, Result, SnapshotError, SnapshotInfo, SnapshotProvider, SnapshotStatus,
    Stage, StageObserver, StageOutcome,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Remote call seen by the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create {
        instance_id: String,
        snapshot_id: String,
    },
    Copy(CopySnapshotRequest),
    Describe(String),
    Share {
        snapshot_id: String,
        account_id: String,
    },
}

/// In-memory provider that records every call
#[derive(Default)]
pub struct MockProvider {
    pub calls: Mutex<Vec<Call>>,
    pub pending_polls: Mutex<HashMap<String, u32>>,
    pub polls_before_available: u32,
    pub fail_create: Option<SnapshotError>,
    pub fail_copy: Option<SnapshotError>,
    pub fail_share: Option<SnapshotError>,
    pub omit_arn: bool,
    pub terminal_status: Option<String>,
    /// Describe error returned for one snapshot id
    pub fail_describe: Option<(String, SnapshotError)>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn describe_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Describe(_)))
            .count()
    }

    /// Calls other than availability polling
    #[allow(dead_code)]
    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Describe(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn register(&self, snapshot_id: &str) {
        self.pending_polls
            .lock()
            .unwrap()
            .insert(snapshot_id.to_string(), self.polls_before_available);
    }
}

#[allow(dead_code)]
pub fn arn_for(snapshot_id: &str) -> String {
    format!("arn:aws:rds:ap-southeast-1:111111111111:snapshot:{}", snapshot_id)
}

#[async_trait]
impl SnapshotProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn create_snapshot(&self, instance_id: &str, snapshot_id: &str) -> Result<SnapshotInfo> {
        self.record(Call::Create {
            instance_id: instance_id.to_string(),
            snapshot_id: snapshot_id.to_string(),
        });
        if let Some(e) = &self.fail_create {
            return Err(e.clone());
        }
        self.register(snapshot_id);
        let info = SnapshotInfo::new(snapshot_id, SnapshotStatus::Creating);
        if self.omit_arn {
            Ok(info)
        } else {
            Ok(info.with_arn(arn_for(snapshot_id)))
        }
    }

    async fn copy_snapshot(&self, request: &CopySnapshotRequest) -> Result<SnapshotInfo> {
        self.record(Call::Copy(request.clone()));
        if let Some(e) = &self.fail_copy {
            return Err(e.clone());
        }
        self.register(&request.target_snapshot_id);
        Ok(
            SnapshotInfo::new(&request.target_snapshot_id, SnapshotStatus::Other("pending".into()))
                .with_arn(arn_for(&request.target_snapshot_id)),
        )
    }

    async fn describe_snapshot(&self, snapshot_id: &str) -> Result<SnapshotInfo> {
        self.record(Call::Describe(snapshot_id.to_string()));
        if let Some((id, e)) = &self.fail_describe {
            if id == snapshot_id {
                return Err(e.clone());
            }
        }
        if let Some(status) = &self.terminal_status {
            return Ok(SnapshotInfo::new(snapshot_id, SnapshotStatus::parse(status)));
        }

        let mut pending = self.pending_polls.lock().unwrap();
        let remaining = pending
            .get_mut(snapshot_id)
            .ok_or_else(|| SnapshotError::SnapshotNotFound(snapshot_id.to_string()))?;
        if *remaining == 0 {
            Ok(SnapshotInfo::new(snapshot_id, SnapshotStatus::Available)
                .with_arn(arn_for(snapshot_id)))
        } else {
            *remaining -= 1;
            Ok(SnapshotInfo::new(snapshot_id, SnapshotStatus::Creating))
        }
    }

    async fn share_snapshot(&self, snapshot_id: &str, account_id: &str) -> Result<()> {
        self.record(Call::Share {
            snapshot_id: snapshot_id.to_string(),
            account_id: account_id.to_string(),
        });
        match &self.fail_share {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// Observer that keeps every notification
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingObserver {
    pub started: Mutex<Vec<(Stage, String)>>,
    pub finished: Mutex<Vec<(Stage, StageOutcome)>>,
}

impl StageObserver for RecordingObserver {
    fn stage_started(&self, stage: Stage, detail: &str) {
        self.started.lock().unwrap().push((stage, detail.to_string()));
    }

    fn stage_finished(&self, stage: Stage, outcome: &StageOutcome) {
        self.finished.lock().unwrap().push((stage, outcome.clone()));
    }
}
