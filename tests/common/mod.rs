#![allow(dead_code)]

pub use sweepbuild_test_utils::builders;
pub use sweepbuild_test_utils::fake_executor;
pub use sweepbuild_test_utils::{init_tracing, with_timeout};

use std::path::Path;

/// Read a log file, panicking with the path if it is missing.
pub fn read_log(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("reading log {:?}: {e}", path))
}
