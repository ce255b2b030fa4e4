#![allow(dead_code)]

use std::path::Path;

use sweepbuild::config::{CommandSection, ConfigFile, RawConfigFile};
use sweepbuild::errors::Result;
use sweepbuild::layout::OutputLayout;
use sweepbuild::task::{BuildTask, TaskParams, build_tasks};
use sweepbuild::types::Budget;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    /// Point `log_dir` and `output_dir` at `logs/` and `out/` under `root`.
    pub fn in_dir(mut self, root: &Path) -> Self {
        self.config.config.log_dir = root.join("logs");
        self.config.config.output_dir = root.join("out");
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.config.sweep.name = name.to_string();
        self
    }

    pub fn budgets(mut self, budgets: &[i64]) -> Self {
        self.config.sweep.budgets = budgets.iter().copied().map(Budget::new).collect();
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.config.config.jobs = Some(jobs);
        self
    }

    pub fn command(mut self, program: &str, args: &[&str]) -> Self {
        self.config.command = Some(CommandSection {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            ..CommandSection::default()
        });
        self
    }

    /// `sh -c <script>`; the script may use `{budget}`, `{output}`, `{log}`.
    pub fn shell(self, script: &str) -> Self {
        self.command("sh", &["-c", script])
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Tasks with a trivial command (`true <budget>`) and paths under `root`.
pub fn simple_tasks(budgets: &[i64], root: &Path) -> Vec<BuildTask> {
    let layout = OutputLayout::new("test", root.join("logs"), root.join("out"));
    let budgets: Vec<Budget> = budgets.iter().copied().map(Budget::new).collect();
    let spec = |p: &TaskParams<'_>| -> Result<Vec<String>> {
        Ok(vec!["true".to_string(), p.budget.to_string()])
    };
    build_tasks(&budgets, &spec, &layout).expect("Failed to build tasks")
}
