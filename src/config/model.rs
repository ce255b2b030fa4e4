// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::engine::WorkerPool;
use crate::exec::ProcessExecutor;
use crate::layout::OutputLayout;
use crate::task::CommandTemplate;
use crate::types::{Budget, BudgetRange};

/// Sweep configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// jobs = 16
/// log_dir = "logs"
/// output_dir = "tmp"
///
/// [sweep]
/// name = "eig-fpopt"
/// budgets = [100, 200]
/// range = { start = 1000, end = 5000, step = 1000 }
/// artifact_extension = "exe"
///
/// [command]
/// program = "clang++"
/// args = ["-mllvm", "--fpopt-comp-cost-budget={budget}", "eig.cpp", "-o", "{output}"]
/// ```
///
/// All sections are optional in the file; `[command]` may instead come from
/// the command line. Use `ConfigFile::try_from` to validate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub sweep: SweepSection,

    #[serde(default)]
    pub command: Option<CommandSection>,
}

/// `[config]` section: run-wide settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Maximum number of builds running at once.
    ///
    /// If `None`, the available parallelism of the machine is used.
    #[serde(default)]
    pub jobs: Option<usize>,

    /// Directory holding one log per budget.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Directory holding one artifact per successful budget.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tmp")
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            jobs: None,
            log_dir: default_log_dir(),
            output_dir: default_output_dir(),
        }
    }
}

/// `[sweep]` section: which budgets to build and how to name the outputs.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepSection {
    /// Prefix for log and artifact file names.
    #[serde(default = "default_name")]
    pub name: String,

    /// Explicit budget values, in order.
    #[serde(default)]
    pub budgets: Vec<Budget>,

    /// Optional inclusive range appended after `budgets`.
    #[serde(default)]
    pub range: Option<BudgetRange>,

    /// Extension for artifact files (`"exe"` → `name-100.exe`).
    #[serde(default)]
    pub artifact_extension: Option<String>,
}

fn default_name() -> String {
    "build".to_string()
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            budgets: Vec::new(),
            range: None,
            artifact_extension: None,
        }
    }
}

/// `[command]` section: the templated toolchain invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandSection {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory for every build process.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Extra environment variables for every build process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Validated configuration.
///
/// Construct via `ConfigFile::try_from(raw)` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub sweep: SweepSection,
    pub command: CommandSection,
    template: CommandTemplate,
    budgets: Vec<Budget>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        sweep: SweepSection,
        command: CommandSection,
        template: CommandTemplate,
        budgets: Vec<Budget>,
    ) -> Self {
        Self {
            config,
            sweep,
            command,
            template,
            budgets,
        }
    }

    pub fn template(&self) -> &CommandTemplate {
        &self.template
    }

    /// All budgets of the sweep: `budgets` followed by the expanded `range`.
    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub fn jobs(&self) -> usize {
        self.config.jobs.unwrap_or_else(WorkerPool::default_jobs)
    }

    pub fn layout(&self) -> OutputLayout {
        let layout = OutputLayout::new(
            self.sweep.name.clone(),
            self.config.log_dir.clone(),
            self.config.output_dir.clone(),
        );
        match &self.sweep.artifact_extension {
            Some(ext) => layout.with_artifact_extension(ext.clone()),
            None => layout,
        }
    }

    pub fn executor(&self) -> ProcessExecutor {
        let executor = self
            .command
            .env
            .iter()
            .fold(ProcessExecutor::new(), |exec, (k, v)| exec.with_env(k.clone(), v.clone()));
        match &self.command.working_dir {
            Some(dir) => executor.with_working_dir(dir.clone()),
            None => executor,
        }
    }
}
