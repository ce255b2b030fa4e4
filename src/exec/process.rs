// src/exec/process.rs

//! Build process runner.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::TaskResult;
use crate::exec::log_file::{OutputTail, append_error_marker, create_log};
use crate::task::BuildTask;

/// Environment variable carrying the budget into every build process.
pub const BUDGET_ENV: &str = "SWEEPBUILD_BUDGET";

/// Lines of output kept for the error excerpt of a failed task.
const TAIL_LINES: usize = 10;

const READ_CHUNK: usize = 8 * 1024;

/// Runs build tasks as child processes, capturing merged stdout/stderr into
/// each task's log file.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    working_dir: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

struct Completion {
    status: ExitStatus,
    tail: OutputTail,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Run one task and convert every outcome, including launch and I/O
    /// errors, into a [`TaskResult`].
    pub async fn run(&self, task: &BuildTask) -> TaskResult {
        match self.run_inner(task).await {
            Ok(Completion { status, .. }) if status.success() => {
                info!(budget = %task.id(), "build process exited successfully");
                TaskResult::success(task)
            }
            Ok(Completion { status, tail }) => {
                let reason = describe_status(status);
                info!(
                    budget = %task.id(),
                    exit_code = status.code().unwrap_or(-1),
                    "build process failed"
                );
                self.fail(task, reason, tail.into_lines()).await
            }
            Err(err) => {
                let reason = format!("{err:#}");
                error!(budget = %task.id(), error = %reason, "build task error");
                self.fail(task, reason, Vec::new()).await
            }
        }
    }

    async fn fail(&self, task: &BuildTask, reason: String, tail: Vec<String>) -> TaskResult {
        if let Err(e) = append_error_marker(task.log_path(), &reason).await {
            warn!(budget = %task.id(), error = ?e, "could not append error marker to log");
        }

        let mut excerpt = reason;
        for line in tail {
            excerpt.push('\n');
            excerpt.push_str(&line);
        }
        TaskResult::failure(task, excerpt)
    }

    async fn run_inner(&self, task: &BuildTask) -> Result<Completion> {
        let mut log = create_log(task.log_path(), &task.command_line()).await?;

        info!(
            budget = %task.id(),
            cmd = %task.command_line(),
            log = %task.log_path().display(),
            "starting build process"
        );

        let mut cmd = Command::new(task.program());
        cmd.args(task.args())
            .env(BUDGET_ENV, task.id().to_string())
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to launch '{}'", task.program()))?;

        // Both pipes feed one channel so the log sees a single merged stream.
        let (chunk_tx, mut chunk_rx) = mpsc::channel::<Vec<u8>>(64);
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, chunk_tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, chunk_tx.clone());
        }
        drop(chunk_tx);

        let mut tail = OutputTail::new(TAIL_LINES);
        let (status, copied) = tokio::join!(
            child.wait(),
            copy_output(&mut chunk_rx, &mut log, &mut tail)
        );

        let status = status
            .with_context(|| format!("waiting for build process of budget {}", task.id()))?;
        copied.with_context(|| format!("writing output to log file {:?}", task.log_path()))?;

        log.flush().await?;
        log.sync_all()
            .await
            .with_context(|| format!("syncing log file {:?}", task.log_path()))?;

        debug!(budget = %task.id(), ?status, "build process output captured");
        Ok(Completion { status, tail })
    }
}

fn spawn_reader<R>(mut reader: R, tx: mpsc::Sender<Vec<u8>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "error reading build output");
                    break;
                }
            }
        }
    });
}

/// Drain the output channel into the log until both pipes close.
///
/// Keeps draining after a write error so the child never blocks on a full
/// pipe; the first error is returned at the end.
async fn copy_output(
    rx: &mut mpsc::Receiver<Vec<u8>>,
    log: &mut File,
    tail: &mut OutputTail,
) -> std::io::Result<()> {
    let mut write_err = None;
    while let Some(chunk) = rx.recv().await {
        tail.push(&chunk);
        if write_err.is_none() {
            if let Err(e) = log.write_all(&chunk).await {
                write_err = Some(e);
            }
        }
    }
    write_err.map_or(Ok(()), Err)
}

fn describe_status(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exit status {code}");
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("terminated by signal {signal}");
        }
    }

    "terminated abnormally".to_string()
}
