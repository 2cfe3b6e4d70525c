//! Core domain types for the Stride guided-session system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise definitions (the catalog vocabulary)
//! - Session engine states and phase log records
//! - Session reports and effectiveness ratings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// A catalog exercise (e.g., "Seated Marching")
///
/// Entries are built once at startup and never mutated; the `id` is the
/// stable slug used by session plans and video locators.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
}

// ============================================================================
// Session Engine States
// ============================================================================

/// Lifecycle state of a session engine
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Idle,
    Exercise,
    Rest,
    Complete,
}

/// Kind of timed phase within a session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Exercise,
    Rest,
}

/// One entry in a session's append-only phase log
///
/// A record is appended once per exercise phase, whether the phase ran its
/// full countdown (`skipped == false`) or was ended early (`skipped == true`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub kind: PhaseKind,
    pub at: DateTime<Utc>,
    pub index: usize,
    pub skipped: bool,
}

// ============================================================================
// Effectiveness Types
// ============================================================================

/// Qualitative effectiveness tier, derived from session duration alone
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum EffectivenessLabel {
    #[serde(rename = "Highly Effective")]
    HighlyEffective,
    #[serde(rename = "Effective")]
    Effective,
    #[serde(rename = "Less Effective")]
    LessEffective,
    #[serde(rename = "Not Effective")]
    NotEffective,
}

impl EffectivenessLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectivenessLabel::HighlyEffective => "Highly Effective",
            EffectivenessLabel::Effective => "Effective",
            EffectivenessLabel::LessEffective => "Less Effective",
            EffectivenessLabel::NotEffective => "Not Effective",
        }
    }

    /// Parse the display form back into a label (used by CSV readback)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Highly Effective" => Some(EffectivenessLabel::HighlyEffective),
            "Effective" => Some(EffectivenessLabel::Effective),
            "Less Effective" => Some(EffectivenessLabel::LessEffective),
            "Not Effective" => Some(EffectivenessLabel::NotEffective),
            _ => None,
        }
    }
}

impl std::fmt::Display for EffectivenessLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Session Report
// ============================================================================

/// The finalized product of a session, built exactly once
///
/// Immutable after construction. The engine hands it to a
/// [`crate::report::ReportSink`] best-effort and to the completion
/// notification; aggregation reads stores of these back to build
/// program-progress statistics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionReport {
    pub id: Uuid,
    pub day: u32,
    pub session: u32,
    pub date: DateTime<Utc>,
    pub planned_duration_sec: u32,
    pub actual_duration_sec: u32,
    pub exercises_planned: u32,
    pub exercises_completed: u32,
    pub exercises_skipped: u32,
    pub rest_extended_count: u32,
    pub effectiveness: EffectivenessLabel,
    pub score: u8,
}
