//! Session report persistence.
//!
//! Reports are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access. The engine treats the sink as
//! best-effort: a save failure is logged and never reaches the caller's
//! completion path.

use crate::{Result, SessionReport};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Report sink trait for persisting finished session reports
pub trait ReportSink {
    fn save(&mut self, report: &SessionReport) -> Result<()>;
}

/// JSONL-based report sink with file locking
pub struct JsonlReportSink {
    path: PathBuf,
}

impl JsonlReportSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl ReportSink for JsonlReportSink {
    fn save(&mut self, report: &SessionReport) -> Result<()> {
        self.ensure_parent_dir()?;

        // Open file for appending
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        // Write report as JSON line
        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(report)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended report {} to store", report.id);
        Ok(())
    }
}

/// Read all reports from a JSONL store
///
/// Corrupt lines are skipped with a warning; partial corruption never fails
/// the whole read.
pub fn read_reports(path: &Path) -> Result<Vec<SessionReport>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut reports = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<SessionReport>(&line) {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::warn!("Failed to parse report at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} reports from store", reports.len());
    Ok(reports)
}
