// src/engine/sweep.rs

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::engine::aggregator::Aggregator;
use crate::engine::pool::WorkerPool;
use crate::engine::summary::RunSummary;
use crate::exec::TaskExecutor;
use crate::task::BuildTask;

/// Run every task through the pool and collect the summary.
///
/// Results are recorded here, in the coordinating task, as they arrive.
/// Task failures never stop the run; contract violations reported by the
/// aggregator are logged and otherwise ignored.
pub async fn run_sweep<E>(
    tasks: Vec<BuildTask>,
    executor: Arc<E>,
    pool: &WorkerPool,
    shutdown: watch::Receiver<bool>,
) -> RunSummary
where
    E: TaskExecutor + ?Sized + 'static,
{
    info!(tasks = tasks.len(), jobs = pool.jobs(), "starting sweep");

    let mut aggregator = Aggregator::new(tasks.iter().map(BuildTask::id));
    let mut handle = pool.spawn(tasks, executor, shutdown);

    while let Some(result) = handle.results.recv().await {
        let budget = result.id;
        let success = result.success;
        let log_path = result.log_path.clone();
        let reason = result.reason().map(str::to_owned);

        match aggregator.record(result) {
            Ok(progress) if success => info!(
                budget = %budget,
                completed = progress.completed,
                total = progress.total,
                "build succeeded"
            ),
            Ok(progress) => warn!(
                budget = %budget,
                completed = progress.completed,
                total = progress.total,
                reason = reason.as_deref().unwrap_or("unknown"),
                log = %log_path.display(),
                "build failed"
            ),
            Err(e) => error!(budget = %budget, error = %e, "scheduler contract violation"),
        }
    }

    handle.join().await;

    let summary = aggregator.finish();
    info!(
        total = summary.total,
        succeeded = summary.succeeded.len(),
        failed = summary.failed.len(),
        interrupted = summary.interrupted,
        "sweep finished"
    );
    summary
}
