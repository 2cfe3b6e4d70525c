//! CSV rollup functionality for archiving session reports.
//!
//! This module implements atomic JSONL-to-CSV conversion with proper error
//! handling to prevent data loss.

use crate::{Result, SessionReport};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    day: u32,
    session: u32,
    date: String,
    planned_duration_sec: u32,
    actual_duration_sec: u32,
    exercises_planned: u32,
    exercises_completed: u32,
    exercises_skipped: u32,
    rest_extended_count: u32,
    effectiveness: String,
    score: u8,
}

impl From<&SessionReport> for CsvRow {
    fn from(report: &SessionReport) -> Self {
        CsvRow {
            id: report.id.to_string(),
            day: report.day,
            session: report.session,
            date: report.date.to_rfc3339(),
            planned_duration_sec: report.planned_duration_sec,
            actual_duration_sec: report.actual_duration_sec,
            exercises_planned: report.exercises_planned,
            exercises_completed: report.exercises_completed,
            exercises_skipped: report.exercises_skipped,
            rest_extended_count: report.rest_extended_count,
            effectiveness: report.effectiveness.as_str().to_string(),
            score: report.score,
        }
    }
}

/// Roll up JSONL reports into CSV and archive the store atomically
///
/// This function:
/// 1. Reads all reports from the JSONL store
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the store to .processed
/// 5. Returns the number of reports processed
///
/// # Safety
/// - CSV is fsynced before the store is renamed
/// - The store is renamed (not deleted) to allow manual recovery if needed
/// - Processed store files can be cleaned up with [`cleanup_processed`]
pub fn reports_to_csv_and_archive(jsonl_path: &Path, csv_path: &Path) -> Result<usize> {
    let reports = crate::report::read_reports(jsonl_path)?;

    if reports.is_empty() {
        tracing::info!("No reports in store to roll up");
        return Ok(0);
    }

    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Open CSV file for appending
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Only write headers when the file is empty
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for report in &reports {
        let row = CsvRow::from(report);
        writer.serialize(row)?;
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} reports to CSV", reports.len());

    // Atomically archive the store by renaming it
    let processed_path = jsonl_path.with_extension("jsonl.processed");
    std::fs::rename(jsonl_path, &processed_path)?;

    tracing::info!("Archived report store to {:?}", processed_path);

    Ok(reports.len())
}

/// Clean up old processed store files
///
/// This removes all .jsonl.processed files in the given directory.
pub fn cleanup_processed(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed store: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed store files", count);
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{JsonlReportSink, ReportSink};
    use crate::types::EffectivenessLabel;
    use chrono::Utc;
    use std::fs::File;
    use uuid::Uuid;

    fn create_test_report(day: u32, session: u32) -> SessionReport {
        SessionReport {
            id: Uuid::new_v4(),
            day,
            session,
            date: Utc::now(),
            planned_duration_sec: 600,
            actual_duration_sec: 645,
            exercises_planned: 6,
            exercises_completed: 5,
            exercises_skipped: 1,
            rest_extended_count: 2,
            effectiveness: EffectivenessLabel::Effective,
            score: 74,
        }
    }

    #[test]
    fn test_rollup_creates_csv_and_archives_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let jsonl_path = temp_dir.path().join("sessions.jsonl");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlReportSink::new(&jsonl_path);
        for day in 1..=3 {
            sink.save(&create_test_report(day, 1)).unwrap();
        }

        let count = reports_to_csv_and_archive(&jsonl_path, &csv_path).unwrap();
        assert_eq!(count, 3);

        assert!(csv_path.exists());
        assert!(!jsonl_path.exists());
        assert!(jsonl_path.with_extension("jsonl.processed").exists());
    }

    #[test]
    fn test_rollup_appends_across_runs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let jsonl_path = temp_dir.path().join("sessions.jsonl");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlReportSink::new(&jsonl_path);
        sink.save(&create_test_report(1, 1)).unwrap();
        assert_eq!(reports_to_csv_and_archive(&jsonl_path, &csv_path).unwrap(), 1);

        let mut sink = JsonlReportSink::new(&jsonl_path);
        sink.save(&create_test_report(1, 2)).unwrap();
        assert_eq!(reports_to_csv_and_archive(&jsonl_path, &csv_path).unwrap(), 1);

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        let record_count = reader.into_records().count();
        assert_eq!(record_count, 2);
    }

    #[test]
    fn test_empty_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let jsonl_path = temp_dir.path().join("empty.jsonl");
        let csv_path = temp_dir.path().join("sessions.csv");

        File::create(&jsonl_path).unwrap();

        let count = reports_to_csv_and_archive(&jsonl_path, &csv_path).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_csv_roundtrips_label_string() {
        let temp_dir = tempfile::tempdir().unwrap();
        let jsonl_path = temp_dir.path().join("sessions.jsonl");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlReportSink::new(&jsonl_path);
        sink.save(&create_test_report(4, 2)).unwrap();
        reports_to_csv_and_archive(&jsonl_path, &csv_path).unwrap();

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert!(contents.contains("Effective"));
        assert!(contents.contains("rest_extended_count"));
    }

    #[test]
    fn test_cleanup_processed() {
        let temp_dir = tempfile::tempdir().unwrap();

        File::create(temp_dir.path().join("s1.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("s2.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("keep.jsonl")).unwrap();

        let count = cleanup_processed(temp_dir.path()).unwrap();
        assert_eq!(count, 2);

        assert!(!temp_dir.path().join("s1.jsonl.processed").exists());
        assert!(!temp_dir.path().join("s2.jsonl.processed").exists());
        assert!(temp_dir.path().join("keep.jsonl").exists());
    }
}
