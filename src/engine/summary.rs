// src/engine/summary.rs

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use crate::engine::INTERRUPTED;
use crate::types::Budget;

/// Exit status when every task succeeded.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status when at least one task failed.
pub const EXIT_TASK_FAILED: i32 = 1;
/// Exit status when the run was interrupted before finishing.
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTask {
    pub log_path: PathBuf,
    pub error: Option<String>,
}

impl FailedTask {
    pub fn reason(&self) -> Option<&str> {
        self.error.as_deref().and_then(|e| e.lines().next())
    }

    pub fn is_interrupted(&self) -> bool {
        self.reason() == Some(INTERRUPTED)
    }
}

/// Immutable end-of-run snapshot.
///
/// For a run that was not interrupted, `succeeded` and `failed` are disjoint
/// and together hold exactly `total` budgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: BTreeSet<Budget>,
    pub failed: BTreeMap<Budget, FailedTask>,
    /// Budgets that never got dispatched (interrupted runs only).
    pub not_run: BTreeSet<Budget>,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        !self.interrupted && self.failed.is_empty() && self.not_run.is_empty()
    }

    pub fn failed_ids(&self) -> impl Iterator<Item = Budget> + '_ {
        self.failed.keys().copied()
    }

    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            EXIT_INTERRUPTED
        } else if self.failed.is_empty() {
            EXIT_SUCCESS
        } else {
            EXIT_TASK_FAILED
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sweep summary:")?;
        writeln!(f, "  total:     {}", self.total)?;
        writeln!(f, "  succeeded: {}", self.succeeded.len())?;
        writeln!(f, "  failed:    {}", self.failed.len())?;
        if self.interrupted {
            writeln!(f, "  not run:   {} (interrupted)", self.not_run.len())?;
        }

        if !self.failed.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failed budgets:")?;
            for (budget, failed) in &self.failed {
                match failed.reason() {
                    Some(reason) => writeln!(
                        f,
                        "  - {budget} ({reason}; see {})",
                        failed.log_path.display()
                    )?,
                    None => writeln!(f, "  - {budget} (see {})", failed.log_path.display())?,
                }
            }
        }

        Ok(())
    }
}
