// src/exec/log_file.rs

//! Per-task log files.
//!
//! Layout of a log:
//!
//! ```text
//! $ clang++ -O3 ... -o tmp/eig-fpopt-100.exe
//! <merged stdout/stderr of the process, verbatim>
//!
//! [sweepbuild] error: exit status 1
//! ```
//!
//! The header is written before launch, so a log exists and is non-empty
//! even when the process never starts. The error marker is only appended for
//! failed tasks.

use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

pub const ERROR_MARKER: &str = "[sweepbuild] error:";

/// Create (truncate) the log file and write the command header.
pub async fn create_log(path: &Path, command_line: &str) -> Result<File> {
    let mut file = File::create(path)
        .await
        .with_context(|| format!("creating log file {:?}", path))?;
    file.write_all(format!("$ {command_line}\n").as_bytes())
        .await
        .with_context(|| format!("writing header to log file {:?}", path))?;
    Ok(file)
}

/// Append `[sweepbuild] error: <reason>` on its own line, creating the file
/// if it does not exist yet.
pub async fn append_error_marker(path: &Path, reason: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("opening log file {:?} for append", path))?;
    file.write_all(format!("\n{ERROR_MARKER} {reason}\n").as_bytes())
        .await
        .with_context(|| format!("appending error marker to {:?}", path))?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

/// Keeps the last `limit` lines of a byte stream for error excerpts.
#[derive(Debug)]
pub struct OutputTail {
    limit: usize,
    lines: VecDeque<String>,
    partial: Vec<u8>,
}

impl OutputTail {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            lines: VecDeque::with_capacity(limit),
            partial: Vec::new(),
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            if byte == b'\n' {
                let line = std::mem::take(&mut self.partial);
                self.push_line(String::from_utf8_lossy(&line).trim_end().to_string());
            } else {
                self.partial.push(byte);
            }
        }
    }

    fn push_line(&mut self, line: String) {
        if self.limit == 0 {
            return;
        }
        if self.lines.len() == self.limit {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Consume the tail, including a trailing line without a newline.
    pub fn into_lines(mut self) -> Vec<String> {
        if !self.partial.is_empty() {
            let line = std::mem::take(&mut self.partial);
            self.push_line(String::from_utf8_lossy(&line).trim_end().to_string());
        }
        self.lines.into()
    }
}
