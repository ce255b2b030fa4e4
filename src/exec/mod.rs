// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs each build task's command with `tokio::process::Command`
//! and turns the outcome into a [`crate::engine::TaskResult`].
//!
//! - [`backend`] provides the `TaskExecutor` trait the worker pool uses, so
//!   tests can swap in a fake executor.
//! - [`process`] contains `ProcessExecutor`, the production implementation.
//! - [`log_file`] creates per-task logs and appends error markers.

pub mod backend;
pub mod log_file;
pub mod process;

pub use backend::TaskExecutor;
pub use log_file::ERROR_MARKER;
pub use process::{BUDGET_ENV, ProcessExecutor};
