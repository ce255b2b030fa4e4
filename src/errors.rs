// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::types::Budget;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Command template error: {0}")]
    Template(String),

    #[error("Duplicate budget {0}: log and artifact paths would collide")]
    DuplicateBudget(Budget),

    #[error("Setup failed: {0}")]
    Setup(String),

    #[error("Received a second result for budget {0}")]
    DuplicateResult(Budget),

    #[error("Received a result for budget {0}, which was never submitted")]
    UnexpectedResult(Budget),
}

pub type Result<T> = std::result::Result<T, SweepError>;
