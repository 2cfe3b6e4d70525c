//! Program-progress aggregation over stored session reports.
//!
//! This module merges reports from the live JSONL store and the CSV archive,
//! then derives the dashboard statistics: completed days, streaks, weekly
//! counts, completion percentage, and a coaching suggestion.

use crate::catalog::PROGRAM_DAYS;
use crate::types::{EffectivenessLabel, SessionReport};
use crate::Result;
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// CSV row format for reading archived reports
#[derive(Debug, Deserialize)]
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

impl TryFrom<CsvRow> for SessionReport {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let date = DateTime::parse_from_rfc3339(&row.date)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        let effectiveness = EffectivenessLabel::parse(&row.effectiveness).ok_or_else(|| {
            crate::Error::Other(format!("Unknown effectiveness '{}'", row.effectiveness))
        })?;

        Ok(SessionReport {
            id,
            day: row.day,
            session: row.session,
            date,
            planned_duration_sec: row.planned_duration_sec,
            actual_duration_sec: row.actual_duration_sec,
            exercises_planned: row.exercises_planned,
            exercises_completed: row.exercises_completed,
            exercises_skipped: row.exercises_skipped,
            rest_extended_count: row.rest_extended_count,
            effectiveness,
            score: row.score,
        })
    }
}

/// Consecutive-day streak statistics
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Streaks {
    pub current: u32,
    pub best: u32,
}

/// Derived program-progress statistics
#[derive(Clone, Debug)]
pub struct ProgressSummary {
    pub total_sessions: usize,
    pub days_completed: Vec<u32>,
    pub last_day: Option<u32>,
    pub streaks: Streaks,
    pub weekly: [u32; 5],
    pub completion_pct: u32,
    pub suggestion: String,
}

/// Load reports from both the JSONL store and the CSV archive
///
/// Returns reports sorted by date (newest first), deduplicated by report id
/// for sessions that appear in both stores.
pub fn load_reports(jsonl_path: &Path, csv_path: &Path) -> Result<Vec<SessionReport>> {
    let mut reports = Vec::new();
    let mut seen_ids = HashSet::new();

    if jsonl_path.exists() {
        for report in crate::report::read_reports(jsonl_path)? {
            seen_ids.insert(report.id);
            reports.push(report);
        }
        tracing::debug!("Loaded {} reports from JSONL store", reports.len());
    }

    if csv_path.exists() {
        let archived = load_reports_from_csv(csv_path)?;
        let mut csv_count = 0;
        for report in archived {
            if !seen_ids.contains(&report.id) {
                seen_ids.insert(report.id);
                reports.push(report);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} reports from CSV archive", csv_count);
    }

    reports.sort_by(|a, b| b.date.cmp(&a.date));

    tracing::info!("Loaded {} total session reports", reports.len());

    Ok(reports)
}

/// Load all reports from a CSV archive
fn load_reports_from_csv(path: &Path) -> Result<Vec<SessionReport>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut reports = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match SessionReport::try_from(row) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(reports)
}

/// Days with at least one session rated above Not Effective
///
/// Returned sorted ascending, deduplicated.
pub fn effective_days(reports: &[SessionReport]) -> Vec<u32> {
    let mut days: Vec<u32> = reports
        .iter()
        .filter(|r| r.effectiveness != EffectivenessLabel::NotEffective)
        .map(|r| r.day)
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}

/// Current and best consecutive-day streaks over sorted day numbers
pub fn calculate_streaks(days: &[u32]) -> Streaks {
    if days.is_empty() {
        return Streaks {
            current: 0,
            best: 0,
        };
    }

    let mut best = 1;
    let mut run = 1;
    for pair in days.windows(2) {
        if pair[1] == pair[0] + 1 {
            run += 1;
            best = best.max(run);
        } else {
            run = 1;
        }
    }

    let mut current = 1;
    for i in (1..days.len()).rev() {
        if days[i] == days[i - 1] + 1 {
            current += 1;
        } else {
            break;
        }
    }

    Streaks { current, best }
}

/// Completed-day counts bucketed into program weeks (1-7, 8-14, 15-21, 22-28, 29-30)
pub fn weekly_counts(days: &[u32]) -> [u32; 5] {
    let mut weeks = [0u32; 5];
    for &d in days {
        if (1..=7).contains(&d) {
            weeks[0] += 1;
        } else if d <= 14 {
            weeks[1] += 1;
        } else if d <= 21 {
            weeks[2] += 1;
        } else if d <= 28 {
            weeks[3] += 1;
        } else if d <= PROGRAM_DAYS {
            weeks[4] += 1;
        }
    }
    weeks
}

/// Share of the 30-day program completed, rounded to whole percent
pub fn completion_percentage(days: &[u32]) -> u32 {
    ((days.len() as f64 / PROGRAM_DAYS as f64) * 100.0).round() as u32
}

/// Tiered coaching message for the dashboard
fn suggestion(
    reports: &[SessionReport],
    days_completed: usize,
    completion_pct: u32,
    streaks: Streaks,
) -> String {
    let skips: u32 = reports.iter().map(|r| r.exercises_skipped).sum();
    let low_scores = reports.iter().filter(|r| r.score < 60).count();

    if days_completed == 0 {
        return "You have not started your exercise plan yet. Start with Day 1 and complete \
                at least 2 sessions today for a strong recovery routine."
            .into();
    }
    if completion_pct < 20 {
        return format!(
            "Good start. You completed {} day(s). Focus on consistency: try to complete \
             at least 4 days this week.",
            days_completed
        );
    }
    if skips > 5 {
        return "Try reducing exercise skips. Consider shorter rest extensions and focusing \
                on posture for each movement."
            .into();
    }
    if low_scores > 3 {
        return "Several sessions had low effectiveness. Aim to keep total time near \
                10 minutes by limiting rest extensions."
            .into();
    }
    if completion_pct >= 60 && streaks.current >= 3 {
        return "Excellent consistency. Keep hydration and sleep in check. Maintain pacing \
                to avoid fatigue."
            .into();
    }
    "Great progress. Maintain daily routine and adjust rests to keep sessions near 10 minutes."
        .into()
}

/// Derive the full progress summary from a set of reports
pub fn summarize(reports: &[SessionReport]) -> ProgressSummary {
    let days = effective_days(reports);
    let streaks = calculate_streaks(&days);
    let weekly = weekly_counts(&days);
    let completion_pct = completion_percentage(&days);
    let suggestion = suggestion(reports, days.len(), completion_pct, streaks);

    ProgressSummary {
        total_sessions: reports.len(),
        last_day: days.last().copied(),
        days_completed: days,
        streaks,
        weekly,
        completion_pct,
        suggestion,
    }
}
