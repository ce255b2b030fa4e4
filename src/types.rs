// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Numeric parameter value that identifies one build task within a sweep.
///
/// Budgets are unique within a run; the decimal form is used verbatim in
/// log and artifact file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct Budget(i64);

impl Budget {
    pub const fn new(value: i64) -> Self {
        Budget(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for Budget {
    fn from(value: i64) -> Self {
        Budget(value)
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Budget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Budget)
            .map_err(|e| format!("invalid budget {s:?}: {e} (expected an integer)"))
    }
}

/// Inclusive arithmetic range of budgets, e.g. `start = 100, end = 500, step = 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BudgetRange {
    pub start: i64,
    pub end: i64,
    #[serde(default = "default_step")]
    pub step: i64,
}

fn default_step() -> i64 {
    1
}

impl BudgetRange {
    /// Number of values the range expands to, or `None` when the range is
    /// malformed (non-positive step, or `start > end`).
    ///
    /// Saturates at `u64::MAX`: the full `i64` span holds `2^64` values.
    pub fn count(&self) -> Option<u64> {
        if self.step <= 0 || self.start > self.end {
            return None;
        }
        let span = (i128::from(self.end) - i128::from(self.start)) as u128;
        let count = span / self.step as u128 + 1;
        Some(u64::try_from(count).unwrap_or(u64::MAX))
    }

    /// Expand into concrete budgets. Callers validate with [`BudgetRange::count`] first.
    pub fn expand(&self) -> Vec<Budget> {
        let Some(len) = self.count() else {
            return Vec::new();
        };
        (0..len)
            .map(|i| Budget((i128::from(self.start) + i128::from(i) * i128::from(self.step)) as i64))
            .collect()
    }
}
