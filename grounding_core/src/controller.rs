//! Exercise session controller.
//!
//! Hosts one `SessionState`, feeds user actions through the progression
//! engine, and runs the completion effect against an injected reporter.

use crate::progression::{transition, Action, Effect};
use crate::session::{Position, SessionState};
use crate::{Catalog, CompletionReporter, Error, ExerciseDefinition, Result};
use chrono::{DateTime, Utc};

/// A catalog item decorated with today's completion status
#[derive(Clone, Debug)]
pub struct CatalogEntry<'c> {
    pub definition: &'c ExerciseDefinition,
    pub completed_today: bool,
}

/// Drives a single user through exercises from one catalog
pub struct ExerciseController<'c, R: CompletionReporter> {
    catalog: &'c Catalog,
    reporter: R,
    state: SessionState,
    started_at: Option<DateTime<Utc>>,
}

impl<'c, R: CompletionReporter> ExerciseController<'c, R> {
    pub fn new(catalog: &'c Catalog, reporter: R) -> Self {
        Self {
            catalog,
            reporter,
            state: SessionState::idle(),
            started_at: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn position(&self) -> Position<'_> {
        self.state.position()
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Catalog view: every exercise in order with its completion mark
    pub fn entries(&self) -> Vec<CatalogEntry<'c>> {
        self.catalog
            .iter()
            .map(|definition| CatalogEntry {
                definition,
                completed_today: self.reporter.is_complete(&definition.id),
            })
            .collect()
    }

    /// Start `exercise_id` from the beginning
    pub fn select(&mut self, exercise_id: &str) -> Result<()> {
        let definition = self
            .catalog
            .get(exercise_id)
            .ok_or_else(|| Error::UnknownExercise(exercise_id.to_string()))?
            .clone();
        self.dispatch(Action::Select(definition));
        Ok(())
    }

    pub fn advance(&mut self) {
        self.dispatch(Action::Advance);
    }

    pub fn retreat(&mut self) {
        self.dispatch(Action::Retreat);
    }

    pub fn confirm(&mut self, tapped: usize) {
        self.dispatch(Action::Confirm(tapped));
    }

    pub fn reset(&mut self) {
        self.dispatch(Action::Reset);
    }

    pub fn exit(&mut self) {
        self.dispatch(Action::Exit);
    }

    /// Finish from the terminal screen; returns true if a completion was reported
    pub fn complete(&mut self) -> bool {
        self.dispatch(Action::Complete)
    }

    /// Apply an action and run its effect. Returns true if a completion was reported.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let selecting = matches!(action, Action::Select(_));
        let state = std::mem::take(&mut self.state);
        let result = transition(state, action);
        self.state = result.state;

        if selecting {
            self.started_at = Some(Utc::now());
        } else if !self.state.is_active() {
            self.started_at = None;
        }

        match result.effect {
            Some(Effect::ReportCompletion { exercise_id }) => {
                self.report(&exercise_id);
                true
            }
            None => false,
        }
    }

    fn report(&mut self, exercise_id: &str) {
        let started_at = self.started_at.take();
        if let Err(e) = self.reporter.mark_complete_since(exercise_id, started_at) {
            // The session has already exited; the reporter owns retries
            tracing::warn!("Failed to record completion of {}: {}", exercise_id, e);
        }
    }
}
