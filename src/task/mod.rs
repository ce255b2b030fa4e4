// src/task/mod.rs

//! Build task descriptors.
//!
//! - [`template`] parses `{budget}` / `{output}` / `{log}` command templates.
//! - [`builder`] turns a budget list into fully resolved [`BuildTask`]s.
//!
//! Everything here is pure: no processes are spawned and nothing is written
//! to disk.

use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::types::Budget;

pub mod builder;
pub mod template;

pub use builder::build_tasks;
pub use template::{CommandTemplate, Param};

/// Values available when resolving the command for one budget.
#[derive(Debug, Clone, Copy)]
pub struct TaskParams<'a> {
    pub budget: Budget,
    pub artifact_path: &'a Path,
    pub log_path: &'a Path,
}

/// Maps one budget to a concrete argument vector (program first).
///
/// Implemented by [`CommandTemplate`] and by any closure
/// `Fn(&TaskParams) -> Result<Vec<String>>`.
pub trait CommandSpec {
    fn resolve(&self, params: &TaskParams<'_>) -> Result<Vec<String>>;
}

impl<F> CommandSpec for F
where
    F: Fn(&TaskParams<'_>) -> Result<Vec<String>>,
{
    fn resolve(&self, params: &TaskParams<'_>) -> Result<Vec<String>> {
        self(params)
    }
}

/// One fully specified unit of work. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTask {
    id: Budget,
    command: Vec<String>,
    log_path: PathBuf,
    artifact_path: PathBuf,
}

impl BuildTask {
    pub(crate) fn new(
        id: Budget,
        command: Vec<String>,
        log_path: PathBuf,
        artifact_path: PathBuf,
    ) -> Self {
        Self {
            id,
            command,
            log_path,
            artifact_path,
        }
    }

    pub fn id(&self) -> Budget {
        self.id
    }

    /// Resolved argv; the first element is the program.
    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// The command as a single display line (not shell-escaped).
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}
