//! Session state for the exercise currently in progress.
//!
//! A `SessionState` is either idle (catalog view) or holds exactly one
//! `ActiveExercise`. The cursor variant always matches the exercise mode, so
//! only one progression model is ever live.

use crate::{ExerciseBody, ExerciseDefinition};

/// Cursor into the active exercise
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// Guided and timed exercises. `index == steps.len()` is terminal.
    Linear { index: usize },
    /// Interactive exercises. `group_index == prompt_groups.len()` is terminal.
    Grouped {
        group_index: usize,
        group_progress: usize,
    },
}

impl Progress {
    /// Zeroed cursor matching the body's mode
    pub fn start(body: &ExerciseBody) -> Self {
        match body {
            ExerciseBody::Guided { .. } | ExerciseBody::Timed { .. } => {
                Progress::Linear { index: 0 }
            }
            ExerciseBody::Interactive { .. } => Progress::Grouped {
                group_index: 0,
                group_progress: 0,
            },
        }
    }
}

/// The selected exercise and how far the user has got through it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveExercise {
    pub(crate) definition: ExerciseDefinition,
    pub(crate) progress: Progress,
}

impl ActiveExercise {
    pub fn new(definition: ExerciseDefinition) -> Self {
        let progress = Progress::start(&definition.body);
        Self {
            definition,
            progress,
        }
    }

    pub fn definition(&self) -> &ExerciseDefinition {
        &self.definition
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn is_terminal(&self) -> bool {
        match (&self.definition.body, self.progress) {
            (ExerciseBody::Interactive { prompt_groups }, Progress::Grouped { group_index, .. }) => {
                group_index >= prompt_groups.len()
            }
            (body, Progress::Linear { index }) => {
                index >= body.steps().map_or(0, |steps| steps.len())
            }
            _ => false,
        }
    }
}

/// What a host should currently show
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Position<'a> {
    /// No exercise selected
    Idle,
    Step {
        index: usize,
        total: usize,
        text: &'a str,
    },
    Group {
        index: usize,
        total: usize,
        label: &'a str,
        prompt: &'a str,
        confirmed: usize,
        required: usize,
    },
    /// Terminal: offer repeat or finish
    Finished,
}

/// Session state owned by the controller
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) active: Option<ActiveExercise>,
}

impl SessionState {
    /// Idle state (catalog view)
    pub fn idle() -> Self {
        Self::default()
    }

    /// Fresh state with `definition` selected and every counter at zero
    pub fn started(definition: ExerciseDefinition) -> Self {
        Self {
            active: Some(ActiveExercise::new(definition)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_exercise(&self) -> Option<&ExerciseDefinition> {
        self.active.as_ref().map(|a| &a.definition)
    }

    pub fn progress(&self) -> Option<Progress> {
        self.active.as_ref().map(|a| a.progress)
    }

    pub fn is_terminal(&self) -> bool {
        self.active.as_ref().is_some_and(ActiveExercise::is_terminal)
    }

    /// Advance is offered on linear exercises until the terminal step
    pub fn can_advance(&self) -> bool {
        matches!(
            self.active,
            Some(ref a) if matches!(a.progress, Progress::Linear { .. }) && !a.is_terminal()
        )
    }

    /// Retreat is only offered past the first step
    pub fn can_retreat(&self) -> bool {
        matches!(
            self.active,
            Some(ActiveExercise { progress: Progress::Linear { index }, .. }) if index > 0
        )
    }

    /// Only the next expected item of the current group responds to taps
    pub fn can_confirm(&self, tapped: usize) -> bool {
        match self.active {
            Some(ref a) if !a.is_terminal() => matches!(
                a.progress,
                Progress::Grouped { group_progress, .. } if group_progress == tapped
            ),
            _ => false,
        }
    }

    pub fn can_complete(&self) -> bool {
        self.is_terminal()
    }

    /// Describe the current screen for a rendering host
    pub fn position(&self) -> Position<'_> {
        let Some(active) = self.active.as_ref() else {
            return Position::Idle;
        };
        if active.is_terminal() {
            return Position::Finished;
        }

        match (&active.definition.body, active.progress) {
            (ExerciseBody::Interactive { prompt_groups }, Progress::Grouped { group_index, group_progress }) => {
                let group = &prompt_groups[group_index];
                Position::Group {
                    index: group_index,
                    total: prompt_groups.len(),
                    label: &group.label,
                    prompt: &group.prompt,
                    confirmed: group_progress,
                    required: group.required_count,
                }
            }
            (body, Progress::Linear { index }) => {
                let steps = body.steps().unwrap_or(&[]);
                Position::Step {
                    index,
                    total: steps.len(),
                    text: &steps[index],
                }
            }
            _ => Position::Idle,
        }
    }
}
