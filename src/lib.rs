// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod layout;
pub mod logging;
pub mod task;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_optional};
use crate::engine::{RunSummary, WorkerPool, run_sweep};
use crate::task::{BuildTask, build_tasks};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + CLI overrides
/// - task resolution (before anything is created or run)
/// - output directory setup
/// - the worker pool and result aggregation
/// - Ctrl-C handling
///
/// Returns the process exit status for the run.
pub async fn run(args: CliArgs) -> Result<i32> {
    let mut raw = load_optional(args.config.as_deref()).context("loading configuration")?;
    args.apply_overrides(&mut raw);
    let cfg = ConfigFile::try_from(raw).context("validating configuration")?;

    if args.dry_run {
        let tasks = build_tasks(cfg.budgets(), cfg.template(), &cfg.layout())?;
        print_dry_run(&cfg, &tasks);
        return Ok(engine::summary::EXIT_SUCCESS);
    }

    // Ctrl-C → stop dispatching and terminate running builds.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        warn!("interrupt received; terminating running builds");
        let _ = shutdown_tx.send(true);
    });

    let summary = execute(&cfg, shutdown_rx).await?;

    println!();
    print!("{summary}");
    println!();
    println!(
        "Artifacts are in {:?}; logs are in {:?}.",
        cfg.config.output_dir, cfg.config.log_dir
    );

    Ok(summary.exit_code())
}

/// Resolve every task, prepare the output directories and run the sweep.
///
/// Fails only on setup problems (bad template, unwritable directories);
/// per-task failures are reported in the returned summary.
pub async fn execute(cfg: &ConfigFile, shutdown: watch::Receiver<bool>) -> Result<RunSummary> {
    let layout = cfg.layout();
    let tasks = build_tasks(cfg.budgets(), cfg.template(), &layout)?;
    let pool = WorkerPool::new(cfg.jobs())?;

    layout.prepare()?;

    info!(
        name = %layout.name,
        budgets = tasks.len(),
        log_dir = %layout.log_dir.display(),
        output_dir = %layout.output_dir.display(),
        "output directories ready"
    );

    let executor = Arc::new(cfg.executor());
    Ok(run_sweep(tasks, executor, &pool, shutdown).await)
}

/// Dry-run output: print every resolved task.
fn print_dry_run(cfg: &ConfigFile, tasks: &[BuildTask]) {
    println!("sweepbuild dry-run");
    println!("  sweep.name = {}", cfg.sweep.name);
    println!("  jobs = {}", cfg.jobs());
    println!("  log_dir = {:?}", cfg.config.log_dir);
    println!("  output_dir = {:?}", cfg.config.output_dir);
    if let Some(dir) = &cfg.command.working_dir {
        println!("  working_dir = {:?}", dir);
    }
    println!();

    println!("tasks ({}):", tasks.len());
    for task in tasks {
        println!("  - budget {}", task.id());
        println!("      cmd: {}", task.command_line());
        println!("      log: {}", task.log_path().display());
        println!("      artifact: {}", task.artifact_path().display());
    }
}
