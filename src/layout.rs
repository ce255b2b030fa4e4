// src/layout.rs

//! Output directory layout.
//!
//! Every task gets one log file and (if its command succeeds) one artifact,
//! both named deterministically from the sweep name and the budget:
//!
//! ```text
//! <log_dir>/<name>-<budget>.log
//! <output_dir>/<name>-<budget>[.<artifact_extension>]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, SweepError};
use crate::types::Budget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub name: String,
    pub log_dir: PathBuf,
    pub output_dir: PathBuf,
    pub artifact_extension: Option<String>,
}

impl OutputLayout {
    pub fn new(name: impl Into<String>, log_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            log_dir: log_dir.into(),
            output_dir: output_dir.into(),
            artifact_extension: None,
        }
    }

    pub fn with_artifact_extension(mut self, ext: impl Into<String>) -> Self {
        self.artifact_extension = Some(ext.into());
        self
    }

    pub fn log_path(&self, budget: Budget) -> PathBuf {
        self.log_dir.join(format!("{}-{}.log", self.name, budget))
    }

    pub fn artifact_path(&self, budget: Budget) -> PathBuf {
        let stem = format!("{}-{}", self.name, budget);
        match self.artifact_extension.as_deref() {
            Some(ext) if !ext.is_empty() => {
                self.output_dir.join(format!("{stem}.{}", ext.trim_start_matches('.')))
            }
            _ => self.output_dir.join(stem),
        }
    }

    /// Create the log and output directories.
    ///
    /// Called once before dispatch so that workers never race on directory
    /// creation. Failure here is fatal for the run.
    pub fn prepare(&self) -> Result<()> {
        for dir in [&self.log_dir, &self.output_dir] {
            create_dir(dir)?;
        }
        Ok(())
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|e| SweepError::Setup(format!("creating directory {:?}: {e}", dir)))?;
    debug!(dir = %dir.display(), "output directory ready");
    Ok(())
}
