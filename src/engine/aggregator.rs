// src/engine/aggregator.rs

//! Incremental classification of task results.
//!
//! The aggregator is owned by the coordinator and fed one [`TaskResult`] at a
//! time, in whatever order tasks complete. It never merges: a second result
//! for the same budget, or a result for a budget that was never submitted,
//! is rejected and left for the caller to report.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::engine::TaskResult;
use crate::engine::summary::{FailedTask, RunSummary};
use crate::errors::{Result, SweepError};
use crate::types::Budget;

/// Live counts after each recorded result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct Aggregator {
    expected: BTreeSet<Budget>,
    succeeded: BTreeSet<Budget>,
    failed: BTreeMap<Budget, FailedTask>,
}

impl Aggregator {
    pub fn new(expected: impl IntoIterator<Item = Budget>) -> Self {
        Self {
            expected: expected.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, result: TaskResult) -> Result<Progress> {
        let id = result.id;

        if !self.expected.contains(&id) {
            return Err(SweepError::UnexpectedResult(id));
        }
        if self.succeeded.contains(&id) || self.failed.contains_key(&id) {
            return Err(SweepError::DuplicateResult(id));
        }

        if result.success {
            self.succeeded.insert(id);
        } else {
            self.failed.insert(
                id,
                FailedTask {
                    log_path: result.log_path,
                    error: result.error,
                },
            );
        }

        let progress = self.progress();
        debug!(budget = %id, ?progress, "result recorded");
        Ok(progress)
    }

    pub fn progress(&self) -> Progress {
        let succeeded = self.succeeded.len();
        let failed = self.failed.len();
        Progress {
            completed: succeeded + failed,
            total: self.expected.len(),
            succeeded,
            failed,
        }
    }

    /// `true` once one result per expected budget has been recorded.
    pub fn is_complete(&self) -> bool {
        self.succeeded.len() + self.failed.len() == self.expected.len()
    }

    /// Snapshot the run. Budgets without a result are reported as not run.
    pub fn finish(self) -> RunSummary {
        let not_run: BTreeSet<Budget> = self
            .expected
            .iter()
            .filter(|id| !self.succeeded.contains(*id) && !self.failed.contains_key(*id))
            .copied()
            .collect();

        let interrupted = !not_run.is_empty() || self.failed.values().any(FailedTask::is_interrupted);

        RunSummary {
            total: self.expected.len(),
            succeeded: self.succeeded,
            failed: self.failed,
            not_run,
            interrupted,
        }
    }
}
