//! Snapshot sharing pipeline
//!
//! Creates a snapshot of a database instance, copies it under a new
//! encryption key and grants another account restore access on the copy.
//!
//! ```text
//! Start ──create──▶ Created ──copy──▶ Copied ──settle, share──▶ Done
//!                      │                 │
//!                      └────▶ Aborted ◀──┘
//! ```
//!
//! `Done` is reached whether or not sharing succeeded; the share outcome is
//! kept in the [`RunReport`].

use crate::error::SnapshotError;
use crate::provider::{CopySnapshotRequest, SnapshotProvider};
use crate::waiter::{PollPolicy, wait_until_available};
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;

const COPIED_SUFFIX: &str = "-to-be-copied";
const SHARED_SUFFIX: &str = "-to-be-shared";

/// Identifier of the snapshot taken from `instance_id`
pub fn created_snapshot_id(instance_id: &str) -> String {
    format!("{}{}", instance_id, COPIED_SUFFIX)
}

/// Identifier of the re-encrypted copy for `instance_id`
pub fn shared_snapshot_id(instance_id: &str) -> String {
    format!("{}{}", instance_id, SHARED_SUFFIX)
}

/// Caller input of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct ShareRequest {
    /// Database instance to snapshot
    pub instance_id: String,

    /// KMS key the copy is encrypted with
    pub kms_key_id: String,

    /// Account granted restore access
    pub destination_account_id: String,
}

impl ShareRequest {
    pub fn new(
        instance_id: impl Into<String>,
        kms_key_id: impl Into<String>,
        destination_account_id: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            kms_key_id: kms_key_id.into(),
            destination_account_id: destination_account_id.into(),
        }
    }
}

/// Pipeline tuning
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Availability polling for the create and copy stages
    pub poll: PollPolicy,

    /// Pause between copy completion and sharing
    pub settle_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            settle_delay: Duration::from_secs(10),
        }
    }
}

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Create,
    Copy,
    Share,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Create => write!(f, "create_snapshot"),
            Stage::Copy => write!(f, "copy_snapshot"),
            Stage::Share => write!(f, "share_snapshot"),
        }
    }
}

/// Pipeline state machine position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Created,
    Copied,
    Done,
    Aborted,
}

/// Result of a single stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// An earlier stage failed
    NotAttempted,
    /// Stage finished; `id` is the value handed to the next stage
    Completed { id: String, elapsed: Duration },
    /// Remote call or availability check failed
    Failed {
        error: SnapshotError,
        elapsed: Duration,
    },
    /// Availability polling ran out of attempts
    TimedOut { attempts: u32, elapsed: Duration },
}

impl StageOutcome {
    fn from_result(result: Result<String, SnapshotError>, elapsed: Duration) -> Self {
        match result {
            Ok(id) => StageOutcome::Completed { id, elapsed },
            Err(SnapshotError::Timeout { attempts, .. }) => {
                StageOutcome::TimedOut { attempts, elapsed }
            }
            Err(error) => StageOutcome::Failed { error, elapsed },
        }
    }

    /// Identifier produced by a completed stage
    pub fn id(&self) -> Option<&str> {
        match self {
            StageOutcome::Completed { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, StageOutcome::Completed { .. })
    }

    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            StageOutcome::NotAttempted => None,
            StageOutcome::Completed { elapsed, .. }
            | StageOutcome::Failed { elapsed, .. }
            | StageOutcome::TimedOut { elapsed, .. } => Some(*elapsed),
        }
    }
}

/// Outcome of a full pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub create: StageOutcome,
    pub copy: StageOutcome,
    pub share: StageOutcome,
    /// Final state
    pub state: PipelineState,
    /// Every state visited, starting with `Start`
    pub transitions: Vec<PipelineState>,
    /// Snapshots whose create or copy request the provider accepted
    pub left_in_place: Vec<String>,
}

impl RunReport {
    fn new() -> Self {
        Self {
            create: StageOutcome::NotAttempted,
            copy: StageOutcome::NotAttempted,
            share: StageOutcome::NotAttempted,
            state: PipelineState::Start,
            transitions: vec![PipelineState::Start],
            left_in_place: Vec::new(),
        }
    }

    fn advance(&mut self, state: PipelineState) {
        tracing::debug!(from = ?self.state, to = ?state, "pipeline transition");
        self.state = state;
        self.transitions.push(state);
    }

    pub fn outcome(&self, stage: Stage) -> &StageOutcome {
        match stage {
            Stage::Create => &self.create,
            Stage::Copy => &self.copy,
            Stage::Share => &self.share,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.state == PipelineState::Aborted
    }

    /// Whether every stage, sharing included, completed
    pub fn is_fully_shared(&self) -> bool {
        self.state == PipelineState::Done && self.share.is_completed()
    }
}

/// Stage instrumentation hook
pub trait StageObserver: Send + Sync {
    /// Called before a stage issues its first remote call
    fn stage_started(&self, _stage: Stage, _detail: &str) {}

    /// Called when a stage starts polling for availability
    fn waiting_for(&self, _stage: Stage, _snapshot_id: &str) {}

    /// Called once a stage has an outcome
    fn stage_finished(&self, stage: Stage, outcome: &StageOutcome);
}

/// Observer that writes stage timings to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn stage_started(&self, stage: Stage, detail: &str) {
        tracing::info!(%stage, "{}", detail);
    }

    fn waiting_for(&self, stage: Stage, snapshot_id: &str) {
        tracing::info!(%stage, snapshot_id, "waiting for snapshot to be available");
    }

    fn stage_finished(&self, stage: Stage, outcome: &StageOutcome) {
        let secs = outcome.elapsed().unwrap_or_default().as_secs_f64();
        match outcome {
            StageOutcome::Completed { id, .. } => {
                tracing::info!(%stage, id = %id, "{} {:.2} s", stage, secs)
            }
            StageOutcome::Failed { error, .. } => {
                tracing::error!(%stage, error = %error, "{} failed after {:.2} s", stage, secs)
            }
            StageOutcome::TimedOut { attempts, .. } => {
                tracing::error!(%stage, attempts, "{} timed out after {:.2} s", stage, secs)
            }
            StageOutcome::NotAttempted => {}
        }
    }
}

/// Sequential create → copy → share orchestrator
pub struct SharePipeline<'a> {
    provider: &'a dyn SnapshotProvider,
    config: PipelineConfig,
    observer: &'a dyn StageObserver,
}

impl<'a> SharePipeline<'a> {
    pub fn new(provider: &'a dyn SnapshotProvider, config: PipelineConfig) -> Self {
        Self {
            provider,
            config,
            observer: &TracingObserver,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn StageObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run all stages, stopping after the first create or copy failure
    pub async fn run(&self, request: &ShareRequest) -> RunReport {
        let mut report = RunReport::new();

        report.create = self
            .create_snapshot(&request.instance_id, &mut report.left_in_place)
            .await;
        let Some(snapshot_arn) = report.create.id().map(str::to_string) else {
            report.advance(PipelineState::Aborted);
            return report;
        };
        report.advance(PipelineState::Created);

        report.copy = self
            .copy_snapshot(
                &snapshot_arn,
                &request.kms_key_id,
                &request.instance_id,
                &mut report.left_in_place,
            )
            .await;
        let Some(copy_id) = report.copy.id().map(str::to_string) else {
            report.advance(PipelineState::Aborted);
            return report;
        };
        report.advance(PipelineState::Copied);

        if !self.config.settle_delay.is_zero() {
            tracing::debug!(delay = ?self.config.settle_delay, "waiting for copy to settle");
            tokio::time::sleep(self.config.settle_delay).await;
        }

        report.share = self
            .share_snapshot(&copy_id, &request.destination_account_id)
            .await;
        report.advance(PipelineState::Done);
        report
    }

    /// Snapshot `instance_id` and wait for it; completes with the snapshot ARN
    ///
    /// The snapshot id is pushed to `left_in_place` as soon as the provider
    /// accepts the request, even if waiting for it later fails.
    pub async fn create_snapshot(
        &self,
        instance_id: &str,
        left_in_place: &mut Vec<String>,
    ) -> StageOutcome {
        let snapshot_id = created_snapshot_id(instance_id);
        let detail = format!("creating snapshot from {} to {}", instance_id, snapshot_id);

        self.stage(Stage::Create, &detail, async {
            let created = self
                .provider
                .create_snapshot(instance_id, &snapshot_id)
                .await?;
            left_in_place.push(created.identifier.clone());
            let arn = created.arn.clone().ok_or_else(|| SnapshotError::MissingField {
                snapshot_id: created.identifier.clone(),
                field: "ARN",
            })?;
            self.observer.waiting_for(Stage::Create, &created.identifier);
            wait_until_available(self.provider, &created.identifier, &self.config.poll).await?;
            Ok::<_, SnapshotError>(arn)
        })
        .await
    }

    /// Copy `source_snapshot` under `kms_key_id`; completes with the copy identifier
    pub async fn copy_snapshot(
        &self,
        source_snapshot: &str,
        kms_key_id: &str,
        instance_id: &str,
        left_in_place: &mut Vec<String>,
    ) -> StageOutcome {
        let copy_request =
            CopySnapshotRequest::new(source_snapshot, shared_snapshot_id(instance_id), kms_key_id);
        let detail = format!(
            "copying snapshot {} and encrypting with KMS key {} to {}",
            source_snapshot, kms_key_id, copy_request.target_snapshot_id
        );

        self.stage(Stage::Copy, &detail, async {
            let copied = self.provider.copy_snapshot(&copy_request).await?;
            left_in_place.push(copied.identifier.clone());
            self.observer.waiting_for(Stage::Copy, &copied.identifier);
            wait_until_available(self.provider, &copied.identifier, &self.config.poll).await?;
            Ok::<_, SnapshotError>(copied.identifier)
        })
        .await
    }

    /// Grant `account_id` restore access; completes with the shared snapshot id
    pub async fn share_snapshot(&self, snapshot_id: &str, account_id: &str) -> StageOutcome {
        let detail = format!("sharing snapshot {} to account {}", snapshot_id, account_id);

        self.stage(Stage::Share, &detail, async {
            self.provider.share_snapshot(snapshot_id, account_id).await?;
            Ok::<_, SnapshotError>(snapshot_id.to_string())
        })
        .await
    }

    async fn stage<F>(&self, stage: Stage, detail: &str, work: F) -> StageOutcome
    where
        F: std::future::Future<Output = Result<String, SnapshotError>>,
    {
        let span = tracing::info_span!("stage", %stage, provider = self.provider.name());
        self.observer.stage_started(stage, detail);

        let started = Instant::now();
        let result = work.instrument(span).await;
        let outcome = StageOutcome::from_result(result, started.elapsed());

        self.observer.stage_finished(stage, &outcome);
        outcome
    }
}
