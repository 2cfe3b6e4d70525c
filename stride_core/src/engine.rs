//! Timer-driven session engine.
//!
//! This module implements the session state machine:
//! - Idle -> Exercise <-> Rest alternation across 6 exercise phases
//! - Pause/resume, skip, and rest-extension controls
//! - Finalization into a [`SessionReport`] via the effectiveness scorer
//!
//! Timing is externally driven: callers deliver one [`SessionEngine::tick`]
//! per nominal second (a real timer, or a manual loop in tests). The engine
//! owns no timer handle of its own, so any number of independent engines can
//! run side by side.

use crate::catalog::{
    Catalog, EXERCISES_PER_SESSION, EXERCISE_DURATION_SEC, PLANNED_SESSION_EXERCISE_TIME_SEC,
    REST_DURATION_SEC,
};
use crate::effectiveness::{compute_effectiveness, EffectivenessInput};
use crate::report::ReportSink;
use crate::types::{ExerciseDefinition, PhaseKind, PhaseRecord, SessionReport, SessionState};
use chrono::Utc;
use uuid::Uuid;

/// Lifecycle notifications emitted by the engine
///
/// All methods default to no-ops so callers implement only what they need.
/// Notifications fire strictly in phase order, exactly once per phase; there
/// is no rest notification after the final exercise.
pub trait SessionObserver {
    fn state_changed(&mut self, _state: SessionState) {}
    fn exercise_started(
        &mut self,
        _index: usize,
        _exercise: &ExerciseDefinition,
        _duration_sec: u32,
    ) {
    }
    fn exercise_ended(&mut self, _index: usize, _exercise: &ExerciseDefinition) {}
    fn rest_started(&mut self, _duration_sec: u32, _index: usize) {}
    fn rest_ended(&mut self, _index: usize) {}
    fn completed(&mut self, _report: &SessionReport) {}
}

/// Observer that ignores every notification
pub struct NullObserver;

impl SessionObserver for NullObserver {}

/// One in-progress guided session
///
/// Owns all per-session state; the catalog is only consulted at construction
/// to resolve the plan. Once `Complete` the engine is inert: controls and
/// ticks become no-ops and the final report stays queryable.
pub struct SessionEngine {
    day: u32,
    session: u32,
    state: SessionState,
    plan: Vec<ExerciseDefinition>,
    current_index: usize,
    remaining_sec: u32,
    total_elapsed_sec: u32,
    skipped_count: u32,
    rest_extended_count: u32,
    log: Vec<PhaseRecord>,
    paused: bool,
    report: Option<SessionReport>,
    observer: Box<dyn SessionObserver>,
    sink: Option<Box<dyn ReportSink>>,
}

impl SessionEngine {
    /// Create an engine for a (day, session) pair over the given catalog
    ///
    /// The 6-exercise plan is resolved up front; unknown ids fall back to a
    /// safe default via [`Catalog::resolve`].
    pub fn new(day: u32, session: u32, catalog: &Catalog) -> Self {
        let plan = catalog
            .session_plan(day, session)
            .iter()
            .map(|id| catalog.resolve(id))
            .collect();
        Self::with_plan(day, session, plan)
    }

    /// Create an engine with an explicit, pre-resolved plan
    ///
    /// An empty plan is replaced with a single placeholder so phase lookups
    /// always succeed.
    pub fn with_plan(day: u32, session: u32, mut plan: Vec<ExerciseDefinition>) -> Self {
        if plan.is_empty() {
            tracing::warn!("Empty session plan for day {} session {}", day, session);
            plan.push(ExerciseDefinition {
                id: "exercise".into(),
                name: "Exercise".into(),
            });
        }

        Self {
            day,
            session,
            state: SessionState::Idle,
            plan,
            current_index: 0,
            remaining_sec: 0,
            total_elapsed_sec: 0,
            skipped_count: 0,
            rest_extended_count: 0,
            log: Vec::new(),
            paused: false,
            report: None,
            observer: Box::new(NullObserver),
            sink: None,
        }
    }

    /// Attach a lifecycle observer
    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Attach a best-effort report sink used at finalization
    pub fn with_report_sink(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    // ------------------------------------------------------------------
    // Controls
    // ------------------------------------------------------------------

    /// Begin the first exercise phase; no-op unless Idle
    pub fn start(&mut self) {
        if self.state != SessionState::Idle {
            return;
        }
        self.transition(SessionState::Exercise);
        self.begin_exercise();
    }

    /// Deliver one nominal second to the active phase
    ///
    /// No-op while Idle, Complete, or paused. When the countdown reaches
    /// zero the phase-completion logic runs synchronously within this call.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        if !matches!(self.state, SessionState::Exercise | SessionState::Rest) {
            return;
        }

        self.remaining_sec = self.remaining_sec.saturating_sub(1);
        self.total_elapsed_sec += 1;

        if self.remaining_sec == 0 {
            if self.state == SessionState::Exercise {
                self.finish_exercise_phase(false);
            } else {
                self.finish_rest_phase();
            }
        }
    }

    /// End the current exercise phase immediately; no-op outside Exercise
    ///
    /// The following rest phase still runs in full.
    pub fn skip_exercise(&mut self) {
        if self.state != SessionState::Exercise {
            return;
        }
        self.skipped_count += 1;
        self.finish_exercise_phase(true);
    }

    /// Add time to the current rest countdown; no-op outside Rest
    ///
    /// `None` applies the default 30 s increment. Each call increments the
    /// extension counter once, however much time it adds.
    pub fn extend_rest(&mut self, extra_sec: Option<u32>) {
        if self.state != SessionState::Rest {
            return;
        }
        self.rest_extended_count += 1;
        self.remaining_sec += extra_sec.unwrap_or(REST_DURATION_SEC);
    }

    /// Freeze the countdown without altering remaining time
    pub fn pause(&mut self) {
        if matches!(self.state, SessionState::Exercise | SessionState::Rest) {
            self.paused = true;
        }
    }

    /// Unfreeze the countdown
    pub fn resume(&mut self) {
        if matches!(self.state, SessionState::Exercise | SessionState::Rest) {
            self.paused = false;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// End the session now and finalize with accumulated progress
    ///
    /// Safe from any state; a second call after Complete is a no-op, so
    /// exactly one report is ever produced.
    pub fn stop(&mut self) {
        if self.state == SessionState::Complete {
            return;
        }
        self.transition(SessionState::Complete);
        self.finalize();
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn session(&self) -> u32 {
        self.session
    }

    pub fn plan(&self) -> &[ExerciseDefinition] {
        &self.plan
    }

    /// Cursor into the plan: exercises started or skipped so far
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn remaining_sec(&self) -> u32 {
        self.remaining_sec
    }

    /// Seconds spent in exercise or rest phases while not paused
    pub fn total_elapsed_sec(&self) -> u32 {
        self.total_elapsed_sec
    }

    pub fn skipped_count(&self) -> u32 {
        self.skipped_count
    }

    pub fn rest_extended_count(&self) -> u32 {
        self.rest_extended_count
    }

    /// Append-only phase log, one record per exercise phase
    pub fn phase_log(&self) -> &[PhaseRecord] {
        &self.log
    }

    /// The final report; `None` until the session completes
    pub fn report(&self) -> Option<&SessionReport> {
        self.report.as_ref()
    }

    // ------------------------------------------------------------------
    // Phase machinery
    // ------------------------------------------------------------------

    fn current_exercise(&self) -> ExerciseDefinition {
        self.plan[self.current_index % self.plan.len()].clone()
    }

    fn begin_exercise(&mut self) {
        let exercise = self.current_exercise();
        self.remaining_sec = EXERCISE_DURATION_SEC;
        self.observer
            .exercise_started(self.current_index, &exercise, EXERCISE_DURATION_SEC);
    }

    fn finish_exercise_phase(&mut self, skipped: bool) {
        self.log.push(PhaseRecord {
            kind: PhaseKind::Exercise,
            at: Utc::now(),
            index: self.current_index,
            skipped,
        });

        if !skipped {
            let exercise = self.current_exercise();
            self.observer.exercise_ended(self.current_index, &exercise);
        }

        self.advance_after_exercise();
    }

    fn advance_after_exercise(&mut self) {
        self.current_index += 1;
        if self.current_index >= EXERCISES_PER_SESSION {
            self.transition(SessionState::Complete);
            self.finalize();
        } else {
            self.transition(SessionState::Rest);
            self.begin_rest();
        }
    }

    fn begin_rest(&mut self) {
        self.remaining_sec = REST_DURATION_SEC;
        self.observer
            .rest_started(REST_DURATION_SEC, self.current_index);
    }

    fn finish_rest_phase(&mut self) {
        self.observer.rest_ended(self.current_index);
        self.transition(SessionState::Exercise);
        self.begin_exercise();
    }

    fn transition(&mut self, to: SessionState) {
        self.state = to;
        self.observer.state_changed(to);
    }

    /// Build the report, persist best-effort, notify completion
    ///
    /// Runs exactly once per engine; every path into `Complete` is guarded
    /// against re-entry. A sink failure is logged and never blocks the
    /// completion notification.
    fn finalize(&mut self) {
        let completed = self.current_index.min(EXERCISES_PER_SESSION) as u32;

        let rating = compute_effectiveness(&EffectivenessInput {
            planned_exercise_sec: PLANNED_SESSION_EXERCISE_TIME_SEC,
            actual_duration_sec: self.total_elapsed_sec,
            skips: self.skipped_count,
            rest_extensions: self.rest_extended_count,
        });

        let report = SessionReport {
            id: Uuid::new_v4(),
            day: self.day,
            session: self.session,
            date: Utc::now(),
            planned_duration_sec: PLANNED_SESSION_EXERCISE_TIME_SEC,
            actual_duration_sec: self.total_elapsed_sec,
            exercises_planned: EXERCISES_PER_SESSION as u32,
            exercises_completed: completed,
            exercises_skipped: self.skipped_count,
            rest_extended_count: self.rest_extended_count,
            effectiveness: rating.effectiveness,
            score: rating.score,
        };

        tracing::info!(
            "Session day {} #{} complete: {}/{} exercises, {}s, {} ({})",
            self.day,
            self.session,
            completed,
            EXERCISES_PER_SESSION,
            self.total_elapsed_sec,
            report.effectiveness,
            report.score
        );

        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.save(&report) {
                tracing::warn!("Failed to persist session report {}: {}", report.id, e);
            }
        }

        self.observer.completed(&report);
        self.report = Some(report);
    }
}
