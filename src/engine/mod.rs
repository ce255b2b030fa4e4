// src/engine/mod.rs

//! Sweep orchestration.
//!
//! This module ties together:
//! - the bounded worker pool that dispatches [`BuildTask`]s to an executor
//! - the aggregator that classifies results as they arrive
//! - the end-of-run [`RunSummary`]
//!
//! [`sweep::run_sweep`] is the coordinator: it owns the aggregator and is the
//! only place results are recorded.

use std::path::PathBuf;

use crate::task::BuildTask;
use crate::types::Budget;

pub mod aggregator;
pub mod pool;
pub mod summary;
pub mod sweep;

pub use aggregator::{Aggregator, Progress};
pub use pool::{PoolHandle, WorkerPool};
pub use summary::{FailedTask, RunSummary};
pub use sweep::run_sweep;

/// Failure reason recorded for tasks whose process was terminated by an
/// interrupt.
pub const INTERRUPTED: &str = "interrupted";

/// Outcome of one build task. Exactly one is produced per dispatched task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub id: Budget,
    pub success: bool,
    pub log_path: PathBuf,
    /// Failure reason, optionally followed by the last lines of output.
    pub error: Option<String>,
}

impl TaskResult {
    pub fn success(task: &BuildTask) -> Self {
        Self {
            id: task.id(),
            success: true,
            log_path: task.log_path().to_path_buf(),
            error: None,
        }
    }

    pub fn failure(task: &BuildTask, error: impl Into<String>) -> Self {
        Self {
            id: task.id(),
            success: false,
            log_path: task.log_path().to_path_buf(),
            error: Some(error.into()),
        }
    }

    /// First line of the error excerpt.
    pub fn reason(&self) -> Option<&str> {
        self.error.as_deref().and_then(|e| e.lines().next())
    }
}
