//! Progression engine: pure transitions over `SessionState`.
//!
//! Progression rules:
//! - Guided/timed: one cursor over the steps, saturating at the terminal index
//! - Interactive: per-group counter, confirmations accepted strictly in order
//! - Invalid actions are absorbed as no-ops, never errors
//!
//! The only side effect is described, not performed: `Complete` at the
//! terminal state yields `Effect::ReportCompletion` for the host to execute.

use crate::session::{ActiveExercise, Progress, SessionState};
use crate::{ExerciseBody, ExerciseDefinition};

/// A user action against the current session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Select(ExerciseDefinition),
    Advance,
    Retreat,
    /// Tap on item `n` (zero-based) of the current prompt group
    Confirm(usize),
    Reset,
    Exit,
    Complete,
}

/// Work the host must carry out after a transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    ReportCompletion { exercise_id: String },
}

/// Result of applying one action
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn quiet(state: SessionState) -> Self {
        Self {
            state,
            effect: None,
        }
    }
}

/// Apply `action` to `state`
pub fn transition(state: SessionState, action: Action) -> Transition {
    match action {
        Action::Select(definition) => {
            tracing::debug!("Selected exercise {}", definition.id);
            Transition::quiet(SessionState::started(definition))
        }
        Action::Exit => Transition::quiet(SessionState::idle()),
        Action::Complete => complete(state),
        Action::Advance => Transition::quiet(map_active(state, advance)),
        Action::Retreat => Transition::quiet(map_active(state, retreat)),
        Action::Confirm(tapped) => Transition::quiet(map_active(state, |a| confirm(a, tapped))),
        Action::Reset => Transition::quiet(map_active(state, reset)),
    }
}

fn map_active(state: SessionState, f: impl FnOnce(&mut ActiveExercise)) -> SessionState {
    let mut state = state;
    if let Some(active) = state.active.as_mut() {
        f(active);
    }
    state
}

fn advance(active: &mut ActiveExercise) {
    let total = active.definition.body.steps().map_or(0, |steps| steps.len());
    if let Progress::Linear { index } = &mut active.progress {
        if *index < total {
            *index += 1;
            tracing::debug!("{}: step {}/{}", active.definition.id, index, total);
        }
    }
}

fn retreat(active: &mut ActiveExercise) {
    if let Progress::Linear { index } = &mut active.progress {
        if *index > 0 {
            *index -= 1;
        }
    }
}

fn confirm(active: &mut ActiveExercise, tapped: usize) {
    let ExerciseBody::Interactive { prompt_groups } = &active.definition.body else {
        return;
    };
    let Progress::Grouped {
        group_index,
        group_progress,
    } = &mut active.progress
    else {
        return;
    };
    let Some(group) = prompt_groups.get(*group_index) else {
        return;
    };

    if tapped != *group_progress {
        tracing::debug!(
            "{}: ignoring tap {} (expecting {})",
            active.definition.id,
            tapped,
            group_progress
        );
        return;
    }

    *group_progress += 1;
    if *group_progress >= group.required_count {
        *group_index += 1;
        *group_progress = 0;
        tracing::debug!(
            "{}: group '{}' done, {}/{} groups",
            active.definition.id,
            group.label,
            group_index,
            prompt_groups.len()
        );
    }
}

fn reset(active: &mut ActiveExercise) {
    active.progress = Progress::start(&active.definition.body);
}

fn complete(state: SessionState) -> Transition {
    match state.active {
        Some(ref active) if active.is_terminal() => {
            let exercise_id = active.definition.id.clone();
            tracing::debug!("Completed exercise {}", exercise_id);
            Transition {
                state: SessionState::idle(),
                effect: Some(Effect::ReportCompletion { exercise_id }),
            }
        }
        _ => Transition::quiet(state),
    }
}
