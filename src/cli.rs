// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{CommandSection, RawConfigFile};
use crate::types::Budget;

/// Command-line arguments for `sweepbuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sweepbuild",
    version,
    about = "Build one variant per budget value, in parallel, and report which ones failed.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Sweep.toml` in the current working directory, if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Budget value to build. Repeatable; replaces the budgets from the
    /// config file.
    #[arg(short, long = "budget", value_name = "N", allow_negative_numbers = true)]
    pub budgets: Vec<Budget>,

    /// Maximum number of builds running at once.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Directory for per-budget logs.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Directory for per-budget artifacts.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// File name prefix for logs and artifacts.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SWEEPBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print every task, but don't create directories or run
    /// anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Command template (program and arguments); replaces `[command]`.
    ///
    /// Placeholders: `{budget}`, `{output}`, `{log}`.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliArgs {
    /// Overlay command-line settings onto a loaded (unvalidated) config.
    pub fn apply_overrides(&self, raw: &mut RawConfigFile) {
        if !self.budgets.is_empty() {
            raw.sweep.budgets = self.budgets.clone();
            raw.sweep.range = None;
        }
        if let Some(jobs) = self.jobs {
            raw.config.jobs = Some(jobs);
        }
        if let Some(dir) = &self.log_dir {
            raw.config.log_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            raw.config.output_dir = dir.clone();
        }
        if let Some(name) = &self.name {
            raw.sweep.name = name.clone();
        }
        if let Some((program, args)) = self.command.split_first() {
            let base = raw.command.take().unwrap_or_default();
            raw.command = Some(CommandSection {
                program: program.clone(),
                args: args.to_vec(),
                ..base
            });
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
