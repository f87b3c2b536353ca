//! Core domain types for the Grounded system.
//!
//! This module defines the data shared by every other module:
//! - Exercise definitions and their mode-specific bodies
//! - Prompt groups for interactive (sense-counting) exercises
//! - Completion records written by the local journal

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Exercise Definition Types
// ============================================================================

/// Display category of an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    Grounding,
    Breathing,
    Relaxation,
    Mindfulness,
}

/// Behaviour mode, derived from the body variant
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseMode {
    Guided,
    Interactive,
    Timed,
}

/// One group of an interactive exercise (e.g. "5 things you can see")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptGroup {
    pub label: String,
    pub prompt: String,
    pub required_count: usize,
}

impl PromptGroup {
    pub fn new(label: &str, prompt: &str, required_count: usize) -> Self {
        Self {
            label: label.into(),
            prompt: prompt.into(),
            required_count,
        }
    }
}

/// Mode-specific content of an exercise
///
/// Guided and timed bodies share the same linear progression; `step_seconds`
/// is only a pacing hint for hosts that auto-advance.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExerciseBody {
    Guided {
        steps: Vec<String>,
    },
    Timed {
        steps: Vec<String>,
        step_seconds: u32,
    },
    Interactive {
        prompt_groups: Vec<PromptGroup>,
    },
}

impl ExerciseBody {
    pub fn mode(&self) -> ExerciseMode {
        match self {
            ExerciseBody::Guided { .. } => ExerciseMode::Guided,
            ExerciseBody::Timed { .. } => ExerciseMode::Timed,
            ExerciseBody::Interactive { .. } => ExerciseMode::Interactive,
        }
    }

    /// Linear steps, or None for interactive bodies
    pub fn steps(&self) -> Option<&[String]> {
        match self {
            ExerciseBody::Guided { steps } | ExerciseBody::Timed { steps, .. } => Some(steps),
            ExerciseBody::Interactive { .. } => None,
        }
    }

    /// Prompt groups, or None for linear bodies
    pub fn prompt_groups(&self) -> Option<&[PromptGroup]> {
        match self {
            ExerciseBody::Interactive { prompt_groups } => Some(prompt_groups),
            _ => None,
        }
    }
}

/// A complete exercise definition from the catalog
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    pub category: ExerciseCategory,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub duration_hint_seconds: u32,
    #[serde(flatten)]
    pub body: ExerciseBody,
}

impl ExerciseDefinition {
    pub fn mode(&self) -> ExerciseMode {
        self.body.mode()
    }
}

// ============================================================================
// Completion Types
// ============================================================================

/// A completed exercise, as written to the journal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompletionRecord {
    pub id: Uuid,
    pub exercise_id: String,
    /// Local calendar day the completion counts towards
    pub completed_on: NaiveDate,
    pub completed_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<u32>,
}

impl CompletionRecord {
    pub fn new(exercise_id: &str, completed_on: NaiveDate, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            exercise_id: exercise_id.to_string(),
            completed_on,
            completed_at,
            started_at: None,
            duration_seconds: None,
        }
    }

    /// Attach the session start time and derive the duration from it
    pub fn with_start(mut self, started_at: DateTime<Utc>) -> Self {
        let elapsed = (self.completed_at - started_at).num_seconds().max(0);
        self.started_at = Some(started_at);
        self.duration_seconds = u32::try_from(elapsed).ok();
        self
    }
}
