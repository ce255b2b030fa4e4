// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SweepError};

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        SweepError::ConfigError(format!("reading config file at {:?}: {e}", path))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;
    debug!(path = %path.display(), "config file loaded");
    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw = load_from_path(path)?;
    ConfigFile::try_from(raw)
}

/// Load the config the CLI asked for.
///
/// - An explicit path must exist.
/// - Without one, `Sweep.toml` in the current directory is used if present.
/// - Otherwise an empty config is returned, so that budgets and command can
///   come entirely from the command line.
pub fn load_optional(explicit: Option<&Path>) -> Result<RawConfigFile> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    let default = default_config_path();
    if default.is_file() {
        load_from_path(&default)
    } else {
        debug!("no config file found; using command-line settings only");
        Ok(RawConfigFile::default())
    }
}

/// Default config location: `Sweep.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Sweep.toml")
}
