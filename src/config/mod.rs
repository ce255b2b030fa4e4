// src/config/mod.rs

//! Configuration loading and validation for sweepbuild.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate budgets, naming and the command template (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_optional};
pub use model::{CommandSection, ConfigFile, ConfigSection, RawConfigFile, SweepSection};
