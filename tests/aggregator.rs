// tests/aggregator.rs

mod common;
use crate::common::builders::simple_tasks;

use std::error::Error;

use sweepbuild::engine::{Aggregator, INTERRUPTED, Progress, TaskResult};
use sweepbuild::errors::SweepError;
use sweepbuild::task::BuildTask;
use sweepbuild::types::Budget;

type TestResult = Result<(), Box<dyn Error>>;

fn setup(values: &[i64]) -> (tempfile::TempDir, Vec<BuildTask>, Aggregator) {
    let dir = tempfile::tempdir().unwrap();
    let tasks = simple_tasks(values, dir.path());
    let aggregator = Aggregator::new(tasks.iter().map(BuildTask::id));
    (dir, tasks, aggregator)
}

#[test]
fn progress_counts_results_in_any_order() -> TestResult {
    let (_dir, tasks, mut agg) = setup(&[10, 20, 30]);

    let p = agg.record(TaskResult::failure(&tasks[2], "exit status 2"))?;
    assert_eq!(
        p,
        Progress {
            completed: 1,
            total: 3,
            succeeded: 0,
            failed: 1
        }
    );

    agg.record(TaskResult::success(&tasks[0]))?;
    assert!(!agg.is_complete());
    let p = agg.record(TaskResult::success(&tasks[1]))?;
    assert_eq!(p.completed, 3);
    assert!(agg.is_complete());

    let summary = agg.finish();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded.len(), 2);
    assert_eq!(summary.failed_ids().collect::<Vec<_>>(), vec![Budget::new(30)]);
    assert!(summary.succeeded.is_disjoint(&summary.failed.keys().copied().collect()));
    assert!(!summary.interrupted);
    Ok(())
}

#[test]
fn second_result_for_same_budget_is_flagged_not_merged() -> TestResult {
    let (_dir, tasks, mut agg) = setup(&[5]);

    agg.record(TaskResult::failure(&tasks[0], "exit status 1"))?;
    let err = agg.record(TaskResult::success(&tasks[0])).unwrap_err();
    assert!(matches!(err, SweepError::DuplicateResult(b) if b == Budget::new(5)));

    // First result stands.
    let summary = agg.finish();
    assert!(summary.succeeded.is_empty());
    assert_eq!(summary.failed.len(), 1);
    Ok(())
}

#[test]
fn result_for_unknown_budget_is_flagged() {
    let (dir, _tasks, mut agg) = setup(&[1, 2]);
    let stray = simple_tasks(&[99], dir.path());

    let err = agg.record(TaskResult::success(&stray[0])).unwrap_err();
    assert!(matches!(err, SweepError::UnexpectedResult(b) if b == Budget::new(99)));
    assert_eq!(agg.progress().completed, 0);
}

#[test]
fn missing_results_are_reported_as_not_run() -> TestResult {
    let (_dir, tasks, mut agg) = setup(&[1, 2, 3]);

    agg.record(TaskResult::success(&tasks[0]))?;
    let summary = agg.finish();

    assert!(summary.interrupted);
    assert_eq!(
        summary.not_run.iter().copied().collect::<Vec<_>>(),
        vec![Budget::new(2), Budget::new(3)]
    );
    assert_eq!(summary.exit_code(), 130);
    assert!(!summary.is_success());
    Ok(())
}

#[test]
fn interrupted_failure_marks_the_run_interrupted() -> TestResult {
    let (_dir, tasks, mut agg) = setup(&[1]);

    agg.record(TaskResult::failure(&tasks[0], INTERRUPTED))?;
    let summary = agg.finish();

    assert!(summary.interrupted);
    assert!(summary.not_run.is_empty());
    Ok(())
}

#[test]
fn rendered_summary_lists_failures_with_log_paths() -> TestResult {
    let (_dir, tasks, mut agg) = setup(&[10, 20, 5]);

    agg.record(TaskResult::success(&tasks[0]))?;
    agg.record(TaskResult::success(&tasks[1]))?;
    agg.record(TaskResult::failure(&tasks[2], "exit status 1\nundefined symbol: foo"))?;
    let summary = agg.finish();
    let text = summary.to_string();

    assert!(text.contains("total:     3"), "{text}");
    assert!(text.contains("succeeded: 2"), "{text}");
    assert!(text.contains("failed:    1"), "{text}");
    assert!(text.contains("Failed budgets:"), "{text}");
    assert!(text.contains("  - 5 (exit status 1; see "), "{text}");
    assert!(text.contains(&tasks[2].log_path().display().to_string()), "{text}");
    assert!(!text.contains("undefined symbol"), "only the reason line is rendered: {text}");
    assert!(!text.contains("not run"), "{text}");
    assert_eq!(summary.exit_code(), 1);
    Ok(())
}

#[test]
fn clean_run_renders_without_failure_section() {
    let (_dir, _tasks, agg) = setup(&[]);
    let summary = agg.finish();
    let text = summary.to_string();

    assert!(text.contains("total:     0"));
    assert!(!text.contains("Failed budgets"));
    assert_eq!(summary.exit_code(), 0);
    assert!(summary.is_success());
}
