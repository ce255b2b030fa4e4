// src/exec/backend.rs

//! Pluggable executor abstraction.
//!
//! The worker pool talks to a `TaskExecutor` instead of spawning processes
//! itself. Production code uses [`ProcessExecutor`]; tests can provide an
//! implementation that records dispatches and returns scripted results
//! without touching the OS.

use std::future::Future;
use std::pin::Pin;

use crate::engine::TaskResult;
use crate::task::BuildTask;

use super::process::ProcessExecutor;

/// Runs one build task to completion.
///
/// Implementations must never fail past this boundary: every error is turned
/// into a failed [`TaskResult`] for the given task.
pub trait TaskExecutor: Send + Sync {
    fn execute(&self, task: BuildTask) -> Pin<Box<dyn Future<Output = TaskResult> + Send + '_>>;
}

impl TaskExecutor for ProcessExecutor {
    fn execute(&self, task: BuildTask) -> Pin<Box<dyn Future<Output = TaskResult> + Send + '_>> {
        Box::pin(async move { self.run(&task).await })
    }
}
