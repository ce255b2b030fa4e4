// tests/process_executor.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, read_log, with_timeout};

use std::error::Error;
use std::path::Path;

use sweepbuild::exec::{BUDGET_ENV, ERROR_MARKER, ProcessExecutor};
use sweepbuild::layout::OutputLayout;
use sweepbuild::task::{BuildTask, CommandTemplate, build_tasks};
use sweepbuild::types::Budget;

type TestResult = Result<(), Box<dyn Error>>;

fn shell_task(root: &Path, budget: i64, script: &str) -> Result<BuildTask, Box<dyn Error>> {
    let layout = OutputLayout::new("t", root.join("logs"), root.join("out"));
    layout.prepare()?;
    let template = CommandTemplate::parse("sh", &["-c".to_string(), script.to_string()])?;
    let mut tasks = build_tasks(&[Budget::new(budget)], &template, &layout)?;
    Ok(tasks.remove(0))
}

#[tokio::test]
async fn successful_command_logs_header_and_output() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let task = shell_task(dir.path(), 10, "echo building {budget}; echo to-stderr >&2")?;

    let result = with_timeout(ProcessExecutor::new().run(&task)).await;

    assert!(result.success);
    assert_eq!(result.id, Budget::new(10));
    assert!(result.error.is_none());

    let log = read_log(task.log_path());
    assert!(log.starts_with("$ sh -c echo building 10"), "{log}");
    assert!(log.contains("building 10"), "{log}");
    assert!(log.contains("to-stderr"), "stderr must be merged into the log: {log}");
    assert!(!log.contains(ERROR_MARKER), "{log}");
    Ok(())
}

#[tokio::test]
async fn silent_success_still_leaves_a_non_empty_log() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let task = shell_task(dir.path(), 1, "true")?;

    let result = with_timeout(ProcessExecutor::new().run(&task)).await;

    assert!(result.success);
    assert!(!read_log(task.log_path()).is_empty());
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_appends_marker_after_output() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let task = shell_task(dir.path(), 5, "echo first; echo 'fatal: bad flag' >&2; exit 3")?;

    let result = with_timeout(ProcessExecutor::new().run(&task)).await;

    assert!(!result.success);
    assert_eq!(result.reason(), Some("exit status 3"));
    let excerpt = result.error.clone().unwrap_or_default();
    assert!(excerpt.contains("fatal: bad flag"), "{excerpt}");

    let log = read_log(task.log_path());
    let output_at = log.find("fatal: bad flag").expect("output captured");
    let marker_at = log.find(ERROR_MARKER).expect("marker appended");
    assert!(output_at < marker_at, "marker must follow the output: {log}");
    assert!(log.contains("[sweepbuild] error: exit status 3"), "{log}");
    Ok(())
}

#[tokio::test]
async fn missing_binary_is_a_failed_result_not_an_error() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let layout = OutputLayout::new("t", dir.path().join("logs"), dir.path().join("out"));
    layout.prepare()?;
    let template = CommandTemplate::parse("/nonexistent/toolchain/clang++", &["{budget}".to_string()])?;
    let task = build_tasks(&[Budget::new(7)], &template, &layout)?.remove(0);

    let result = with_timeout(ProcessExecutor::new().run(&task)).await;

    assert!(!result.success);
    let reason = result.reason().unwrap_or_default();
    assert!(reason.contains("failed to launch"), "{reason}");

    let log = read_log(task.log_path());
    assert!(log.starts_with("$ /nonexistent/toolchain/clang++ 7"), "{log}");
    assert!(log.contains(ERROR_MARKER), "{log}");
    Ok(())
}

#[tokio::test]
async fn budget_env_working_dir_and_extra_env_reach_the_process() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let workdir = dir.path().join("work");
    std::fs::create_dir_all(&workdir)?;
    let task = shell_task(
        dir.path(),
        42,
        &format!("echo budget=${BUDGET_ENV} extra=$EXTRA; pwd"),
    )?;

    let executor = ProcessExecutor::new()
        .with_working_dir(&workdir)
        .with_env("EXTRA", "yes");
    let result = with_timeout(executor.run(&task)).await;

    assert!(result.success);
    let log = read_log(task.log_path());
    assert!(log.contains("budget=42 extra=yes"), "{log}");
    assert!(log.contains("work"), "{log}");
    Ok(())
}

#[tokio::test]
async fn missing_log_directory_is_a_failed_result() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let layout = OutputLayout::new("t", dir.path().join("no-such-dir"), dir.path().join("out"));
    let template = CommandTemplate::parse("true", &[])?;
    let task = build_tasks(&[Budget::new(1)], &template, &layout)?.remove(0);

    let result = with_timeout(ProcessExecutor::new().run(&task)).await;

    assert!(!result.success);
    assert!(result.reason().unwrap_or_default().contains("creating log file"));
    Ok(())
}
