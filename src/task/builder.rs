// src/task/builder.rs

//! Budget list → build task list.

use std::collections::HashSet;

use tracing::debug;

use crate::errors::{Result, SweepError};
use crate::layout::OutputLayout;
use crate::task::{BuildTask, CommandSpec, TaskParams};
use crate::types::Budget;

/// Resolve one [`BuildTask`] per budget, preserving input order.
///
/// Fails before anything runs if:
/// - a budget appears twice (its log and artifact paths would collide), or
/// - the command cannot be resolved for some budget (the error names it).
pub fn build_tasks<S>(budgets: &[Budget], spec: &S, layout: &OutputLayout) -> Result<Vec<BuildTask>>
where
    S: CommandSpec + ?Sized,
{
    let mut seen = HashSet::with_capacity(budgets.len());
    let mut tasks = Vec::with_capacity(budgets.len());

    for &budget in budgets {
        if !seen.insert(budget) {
            return Err(SweepError::DuplicateBudget(budget));
        }
        tasks.push(build_task(budget, spec, layout)?);
    }

    debug!(count = tasks.len(), "build tasks resolved");
    Ok(tasks)
}

fn build_task<S>(budget: Budget, spec: &S, layout: &OutputLayout) -> Result<BuildTask>
where
    S: CommandSpec + ?Sized,
{
    let log_path = layout.log_path(budget);
    let artifact_path = layout.artifact_path(budget);

    let params = TaskParams {
        budget,
        artifact_path: &artifact_path,
        log_path: &log_path,
    };

    let command = spec.resolve(&params).map_err(|e| {
        let msg = match e {
            SweepError::Template(msg) => msg,
            other => other.to_string(),
        };
        SweepError::Template(format!("budget {budget}: {msg}"))
    })?;

    match command.first() {
        None => {
            return Err(SweepError::Template(format!(
                "budget {budget}: command resolved to an empty argument list"
            )));
        }
        Some(program) if program.trim().is_empty() => {
            return Err(SweepError::Template(format!(
                "budget {budget}: program resolved to an empty string"
            )));
        }
        Some(_) => {}
    }

    Ok(BuildTask::new(budget, command, log_path, artifact_path))
}
