// src/config/validate.rs

use std::collections::HashSet;

use tracing::warn;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SweepError};
use crate::task::{CommandTemplate, Param};
use crate::types::Budget;

/// Upper bound on the number of budgets a `range` may expand to.
pub const MAX_RANGE_LEN: u64 = 100_000;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SweepError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_global_config(&raw)?;
        validate_sweep_name(&raw)?;
        let budgets = collect_budgets(&raw)?;
        let template = parse_command(&raw)?;

        let command = raw.command.unwrap_or_default();
        Ok(ConfigFile::new_unchecked(
            raw.config, raw.sweep, command, template, budgets,
        ))
    }
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.jobs == Some(0) {
        return Err(SweepError::ConfigError(
            "[config].jobs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_sweep_name(cfg: &RawConfigFile) -> Result<()> {
    let name = cfg.sweep.name.trim();
    if name.is_empty() {
        return Err(SweepError::ConfigError(
            "[sweep].name must not be empty".to_string(),
        ));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(SweepError::ConfigError(format!(
            "[sweep].name {:?} must be a plain file name prefix",
            cfg.sweep.name
        )));
    }
    Ok(())
}

/// `budgets` followed by the expanded `range`, rejecting duplicates.
fn collect_budgets(cfg: &RawConfigFile) -> Result<Vec<Budget>> {
    let mut budgets = cfg.sweep.budgets.clone();

    if let Some(range) = cfg.sweep.range {
        let len = range.count().ok_or_else(|| {
            SweepError::ConfigError(format!(
                "[sweep].range is invalid: start = {}, end = {}, step = {} (need step > 0 and start <= end)",
                range.start, range.end, range.step
            ))
        })?;
        if len > MAX_RANGE_LEN {
            return Err(SweepError::ConfigError(format!(
                "[sweep].range expands to {len} budgets (limit is {MAX_RANGE_LEN})"
            )));
        }
        budgets.extend(range.expand());
    }

    let mut seen = HashSet::with_capacity(budgets.len());
    for budget in &budgets {
        if !seen.insert(*budget) {
            return Err(SweepError::DuplicateBudget(*budget));
        }
    }

    Ok(budgets)
}

fn parse_command(cfg: &RawConfigFile) -> Result<CommandTemplate> {
    let Some(command) = cfg.command.as_ref() else {
        return Err(SweepError::ConfigError(
            "no command configured: add a [command] section or pass one after `--`".to_string(),
        ));
    };

    let template = CommandTemplate::parse(&command.program, &command.args)?;

    if !template.uses(Param::Budget) {
        warn!(
            program = %command.program,
            "command template never references {{budget}}; every budget runs the same command"
        );
    }

    Ok(template)
}
