#![forbid(unsafe_code)]

//! Core domain model and business logic for the Stride guided-session system.
//!
//! This crate provides:
//! - Domain types (exercises, phases, reports, effectiveness labels)
//! - The built-in exercise catalog and deterministic session rotation
//! - The effectiveness scorer
//! - The timer-driven session engine
//! - Report persistence (JSONL store, CSV archive) and progress aggregation

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod effectiveness;
pub mod engine;
pub mod report;
pub mod aggregation;
pub mod csv_rollup;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, sessions_for_day, Catalog};
pub use config::Config;
pub use effectiveness::{compute_effectiveness, EffectivenessInput, EffectivenessRating};
pub use engine::{NullObserver, SessionEngine, SessionObserver};
pub use report::{JsonlReportSink, ReportSink};
pub use aggregation::{load_reports, summarize, ProgressSummary, Streaks};
