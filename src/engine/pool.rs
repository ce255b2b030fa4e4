// src/engine/pool.rs

//! Bounded worker pool.
//!
//! `jobs` workers pull from one shared FIFO of pending tasks and push one
//! [`TaskResult`] per task into a shared channel. A worker holds its slot for
//! the whole life of a task (dispatch → process exit → log write → result)
//! before pulling the next one.
//!
//! - No fail-fast: a failed task never prevents the remaining ones from
//!   being dispatched.
//! - Each execution runs in its own Tokio task, so a panic inside an
//!   executor still yields a failed result for that task.
//! - When the shutdown watch flips to `true`, workers stop pulling tasks and
//!   abort in-flight executions. Dropping the execution future kills its
//!   child process (`kill_on_drop`), and the task is reported as
//!   [`INTERRUPTED`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, warn};

use crate::engine::{INTERRUPTED, TaskResult};
use crate::errors::{Result, SweepError};
use crate::exec::TaskExecutor;
use crate::exec::log_file::append_error_marker;
use crate::task::BuildTask;

type TaskQueue = Arc<Mutex<VecDeque<BuildTask>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    jobs: usize,
}

impl WorkerPool {
    /// Create a pool with `jobs` concurrent slots (must be >= 1).
    pub fn new(jobs: usize) -> Result<Self> {
        if jobs == 0 {
            return Err(SweepError::ConfigError(
                "number of parallel jobs must be >= 1 (got 0)".to_string(),
            ));
        }
        Ok(Self { jobs })
    }

    /// Pool sized to the available parallelism of this machine.
    pub fn with_default_jobs() -> Self {
        Self {
            jobs: Self::default_jobs(),
        }
    }

    pub fn default_jobs() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Start workers for `tasks`.
    ///
    /// Results arrive on [`PoolHandle::results`] in completion order. The
    /// channel closes once every worker has exited.
    pub fn spawn<E>(
        &self,
        tasks: Vec<BuildTask>,
        executor: Arc<E>,
        shutdown: watch::Receiver<bool>,
    ) -> PoolHandle
    where
        E: TaskExecutor + ?Sized + 'static,
    {
        let workers = self.jobs.min(tasks.len());
        let (results_tx, results_rx) = mpsc::channel::<TaskResult>(64);
        let queue: TaskQueue = Arc::new(Mutex::new(tasks.into()));

        debug!(workers, jobs = self.jobs, "spawning workers");

        let handles = (0..workers)
            .map(|worker| {
                let queue = Arc::clone(&queue);
                let executor = Arc::clone(&executor);
                let results_tx = results_tx.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(worker_loop(worker, queue, executor, results_tx, shutdown))
            })
            .collect();

        PoolHandle {
            results: results_rx,
            workers: handles,
        }
    }
}

/// Running pool: a stream of results plus the worker join handles.
pub struct PoolHandle {
    pub results: mpsc::Receiver<TaskResult>,
    workers: Vec<JoinHandle<()>>,
}

impl fmt::Debug for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolHandle")
            .field("workers", &self.workers.len())
            .finish_non_exhaustive()
    }
}

impl PoolHandle {
    /// Wait for every worker to exit.
    pub async fn join(self) {
        for (worker, handle) in self.workers.into_iter().enumerate() {
            if let Err(e) = handle.await {
                error!(worker, error = %e, "worker exited abnormally");
            }
        }
    }
}

async fn worker_loop<E>(
    worker: usize,
    queue: TaskQueue,
    executor: Arc<E>,
    results: mpsc::Sender<TaskResult>,
    mut shutdown: watch::Receiver<bool>,
) where
    E: TaskExecutor + ?Sized + 'static,
{
    debug!(worker, "worker started");

    loop {
        if *shutdown.borrow() {
            debug!(worker, "shutdown requested; not pulling further tasks");
            break;
        }

        let Some(task) = next_task(&queue) else {
            break;
        };

        let result = run_one(worker, task, &executor, &mut shutdown).await;

        if results.send(result).await.is_err() {
            warn!(worker, "result channel closed; worker stopping");
            break;
        }
    }

    debug!(worker, "worker finished");
}

fn next_task(queue: &TaskQueue) -> Option<BuildTask> {
    match queue.lock() {
        Ok(mut pending) => pending.pop_front(),
        Err(poisoned) => poisoned.into_inner().pop_front(),
    }
}

/// Execute one task and produce exactly one result for it.
async fn run_one<E>(
    worker: usize,
    task: BuildTask,
    executor: &Arc<E>,
    shutdown: &mut watch::Receiver<bool>,
) -> TaskResult
where
    E: TaskExecutor + ?Sized + 'static,
{
    let id = task.id();
    debug!(worker, budget = %id, "dispatching task");

    let exec = Arc::clone(executor);
    let dispatched = task.clone();
    let mut handle = tokio::spawn(async move { exec.execute(dispatched).await });

    tokio::select! {
        joined = &mut handle => settle(worker, &task, joined).await,
        _ = shutdown_requested(shutdown) => {
            handle.abort();
            match handle.await {
                Err(e) if e.is_cancelled() => {
                    warn!(worker, budget = %id, "task interrupted; child process terminated");
                    fault(&task, INTERRUPTED).await
                }
                // Finished before the abort landed; keep its outcome.
                finished => settle(worker, &task, finished).await,
            }
        }
    }
}

/// Turn the join outcome of a dispatched execution into its result.
async fn settle(
    worker: usize,
    task: &BuildTask,
    joined: std::result::Result<TaskResult, JoinError>,
) -> TaskResult {
    let id = task.id();
    match joined {
        Ok(result) if result.id == id => result,
        Ok(result) => {
            warn!(
                worker,
                budget = %id,
                reported = %result.id,
                "executor reported a different task id; attributing result to the dispatched task"
            );
            TaskResult {
                id,
                log_path: task.log_path().to_path_buf(),
                ..result
            }
        }
        Err(e) => {
            error!(worker, budget = %id, error = %e, "task execution fault");
            fault(task, format!("internal fault: {e}")).await
        }
    }
}

async fn fault(task: &BuildTask, reason: impl Into<String>) -> TaskResult {
    let reason = reason.into();
    if let Err(e) = append_error_marker(task.log_path(), &reason).await {
        warn!(budget = %task.id(), error = %e, "could not append error marker to log");
    }
    TaskResult::failure(task, reason)
}

/// Resolves once shutdown is requested; never resolves if the sender is gone.
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    let stopped = rx.wait_for(|stop| *stop).await.is_ok();
    if !stopped {
        std::future::pending::<()>().await;
    }
}
