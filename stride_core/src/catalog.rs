//! Built-in exercise catalog and session-shape constants.
//!
//! This module provides the fixed vocabulary of exercises, the scheduling
//! constants, and the deterministic day/session rotation.

use crate::types::ExerciseDefinition;
use once_cell::sync::Lazy;

/// Seconds each exercise phase runs
pub const EXERCISE_DURATION_SEC: u32 = 60;

/// Seconds each rest phase runs (also the default rest extension)
pub const REST_DURATION_SEC: u32 = 30;

/// Exercise phases per session
pub const EXERCISES_PER_SESSION: usize = 6;

/// Nominal total session duration (exercises plus pacing) the scorer targets
pub const PLANNED_SESSION_EXERCISE_TIME_SEC: u32 = 600;

/// Length of the full program in days
pub const PROGRAM_DAYS: u32 = 30;

/// Media extension appended by [`video_src`]
const VIDEO_EXTENSION: &str = ".mp4";

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
///
/// This function returns a reference to the pre-built catalog, avoiding
/// the overhead of rebuilding it on every operation.
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// The ordered catalog of exercises
///
/// Entry order is load-bearing: it defines the indexing used by
/// [`Catalog::session_plan`] rotation.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: Vec<ExerciseDefinition>,
}

/// Builds the default catalog with the built-in 12 exercises
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns
/// a cached reference. This function is retained for testing and custom
/// catalog creation.
pub fn build_default_catalog() -> Catalog {
    let exercises = [
        ("band_external_rotation", "Band External Rotation"),
        ("cross_chest_arms_swing", "Cross Chest Arms Swing"),
        ("grapevine", "Grapevine"),
        ("high_knee_marching", "High-Knee Marching"),
        ("inclined_pushups", "Inclined Pushups"),
        ("mini_squats", "Mini squats"),
        ("obstacle_walk", "Obstacle Walk Exercise"),
        ("seated_marching", "Seated Marching"),
        ("single_leg_stand", "Single Leg Stand"),
        ("sit_to_stand", "Sit to stand"),
        ("standing_trunk_rotation", "Standing Trunk Rotation"),
        ("wall_ball_dribbling", "Wall Ball Dribbling Exercise"),
    ]
    .into_iter()
    .map(|(id, name)| ExerciseDefinition {
        id: id.into(),
        name: name.into(),
    })
    .collect();

    Catalog { exercises }
}

/// Number of sessions scheduled for a program day
///
/// Days 1-19 get 2 sessions, days 20-30 get 3.
pub fn sessions_for_day(day: u32) -> u32 {
    if day <= 19 {
        2
    } else {
        3
    }
}

/// Build a video resource locator for an exercise id
///
/// Purely a naming convention (`{base}{id}.mp4`); existence of the file is
/// not checked. The base path comes from [`crate::config::VideoConfig`].
pub fn video_src(base_path: &str, exercise_id: &str) -> String {
    format!("{}{}{}", base_path, exercise_id, VIDEO_EXTENSION)
}

impl Catalog {
    /// Deterministic 6-exercise plan for a (day, session) pair
    ///
    /// The start index rotates through the catalog
    /// (`((day-1)*3 + (session-1)*2) mod len`) and the plan takes consecutive
    /// entries with wraparound. Same inputs always yield the same plan.
    /// Out-of-range inputs degrade via saturating/modulo arithmetic rather
    /// than erroring.
    pub fn session_plan(&self, day: u32, session: u32) -> Vec<String> {
        let total = self.exercises.len();
        if total == 0 {
            return Vec::new();
        }

        let start =
            (day.saturating_sub(1) as usize * 3 + session.saturating_sub(1) as usize * 2) % total;

        (0..EXERCISES_PER_SESSION)
            .map(|i| self.exercises[(start + i) % total].id.clone())
            .collect()
    }

    /// Linear lookup by id; a miss is a normal outcome, not an error
    pub fn find_by_id(&self, id: &str) -> Option<&ExerciseDefinition> {
        self.exercises.iter().find(|ex| ex.id == id)
    }

    /// Lookup with safe-default substitution for malformed ids
    ///
    /// Falls back to the first catalog entry, or a placeholder definition if
    /// the catalog is empty, so callers never have to handle a miss.
    pub fn resolve(&self, id: &str) -> ExerciseDefinition {
        if let Some(ex) = self.find_by_id(id) {
            return ex.clone();
        }

        tracing::warn!("Unknown exercise id '{}', substituting default", id);
        self.exercises.first().cloned().unwrap_or_else(|| ExerciseDefinition {
            id: id.into(),
            name: "Exercise".into(),
        })
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.exercises.is_empty() {
            errors.push("Catalog has no exercises".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for ex in &self.exercises {
            if ex.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if ex.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", ex.id));
            }
            if !seen.insert(ex.id.as_str()) {
                errors.push(format!("Duplicate exercise ID '{}'", ex.id));
            }
        }

        if self.exercises.len() < EXERCISES_PER_SESSION {
            errors.push(format!(
                "Catalog has {} exercises, need at least {} per session",
                self.exercises.len(),
                EXERCISES_PER_SESSION
            ));
        }

        errors
    }
}
