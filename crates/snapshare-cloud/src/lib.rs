//! snapshare cloud layer
//!
//! Provider abstraction and the snapshot sharing pipeline. A run snapshots a
//! database instance, copies the snapshot under a caller supplied encryption
//! key and grants another account restore access on the copy.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  snapshare CLI                   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                snapshare-cloud                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │ SharePipeline: create → copy → share      │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌────────────────────────┐   │
//! │  │    Waiter    │  │ trait SnapshotProvider │   │
//! │  └──────────────┘  └────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼────────┐
//!           │ snapshare-     │
//!           │ cloud-aws (RDS)│
//!           └────────────────┘
//! ```

pub mod error;
pub mod pipeline;
pub mod provider;
pub mod waiter;

// Re-exports
pub use error::{Result, SnapshotError};
pub use pipeline::{
    PipelineConfig, PipelineState, RunReport, SharePipeline, ShareRequest, Stage, StageObserver,
    StageOutcome, TracingObserver, created_snapshot_id, shared_snapshot_id,
};
pub use provider::{
    CopySnapshotRequest, RESTORE_ATTRIBUTE, SnapshotInfo, SnapshotProvider, SnapshotStatus,
};
pub use waiter::{PollPolicy, wait_until_available};
