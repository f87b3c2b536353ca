//! Exercise catalog: the built-in exercises and schema validation.
//!
//! A `Catalog` can only be built through `Catalog::new`, which rejects any
//! definition that would leave a session without a reachable terminal state.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog of built-in exercises
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

/// An ordered, validated list of exercise definitions
#[derive(Clone, Debug)]
pub struct Catalog {
    exercises: Vec<ExerciseDefinition>,
}

impl Catalog {
    /// Build a catalog, failing on the first invalid or duplicate entry
    pub fn new(exercises: Vec<ExerciseDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for def in &exercises {
            def.validate()?;
            if !seen.insert(def.id.as_str()) {
                return Err(Error::invalid_entry(&def.id, "duplicate exercise id"));
            }
        }

        tracing::debug!("Built catalog with {} exercises", exercises.len());
        Ok(Self { exercises })
    }

    /// Return a new catalog with `extra` appended after the current entries
    pub fn with_additional(&self, extra: Vec<ExerciseDefinition>) -> Result<Self> {
        let mut exercises = self.exercises.clone();
        exercises.extend(extra);
        Self::new(exercises)
    }

    pub fn get(&self, id: &str) -> Option<&ExerciseDefinition> {
        self.exercises.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExerciseDefinition> {
        self.exercises.iter()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// All exercises of a category, in catalog order
    pub fn by_category(&self, category: ExerciseCategory) -> Vec<&ExerciseDefinition> {
        self.exercises
            .iter()
            .filter(|d| d.category == category)
            .collect()
    }
}

/// Check custom definitions before they are merged into `base`
///
/// Unlike `Catalog::new`, this keeps going and reports every problem, one
/// message per violation.
pub fn validate_additions(base: &Catalog, extra: &[ExerciseDefinition]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = base.iter().map(|d| d.id.as_str()).collect();

    for def in extra {
        if let Err(e) = def.validate() {
            errors.push(e.to_string());
        }
        if !seen.insert(def.id.as_str()) {
            errors.push(format!("Exercise id '{}' appears more than once", def.id));
        }
    }

    errors
}

impl ExerciseDefinition {
    /// Check the invariants a definition must satisfy before it can be selected
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::invalid_entry(&self.id, "empty id"));
        }
        if self.name.trim().is_empty() {
            return Err(Error::invalid_entry(&self.id, "empty name"));
        }

        match &self.body {
            ExerciseBody::Guided { steps } | ExerciseBody::Timed { steps, .. } => {
                if steps.is_empty() {
                    return Err(Error::invalid_entry(&self.id, "no steps"));
                }
                if let Some(pos) = steps.iter().position(|s| s.trim().is_empty()) {
                    return Err(Error::invalid_entry(
                        &self.id,
                        format!("step {} is blank", pos + 1),
                    ));
                }
            }
            ExerciseBody::Interactive { prompt_groups } => {
                if prompt_groups.is_empty() {
                    return Err(Error::invalid_entry(&self.id, "no prompt groups"));
                }
                if let Some(group) = prompt_groups.iter().find(|g| g.required_count == 0) {
                    return Err(Error::invalid_entry(
                        &self.id,
                        format!("prompt group '{}' requires zero confirmations", group.label),
                    ));
                }
            }
        }

        if let ExerciseBody::Timed { step_seconds: 0, .. } = self.body {
            return Err(Error::invalid_entry(&self.id, "timed step length is zero"));
        }

        Ok(())
    }
}

fn steps(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    let exercises = vec![
        ExerciseDefinition {
            id: "senses_54321".into(),
            name: "5-4-3-2-1 Grounding".into(),
            category: ExerciseCategory::Grounding,
            summary: "Anchor yourself in the present by working through all five senses.".into(),
            duration_hint_seconds: 180,
            body: ExerciseBody::Interactive {
                prompt_groups: vec![
                    PromptGroup::new("See", "Name 5 things you can see around you", 5),
                    PromptGroup::new("Touch", "Notice 4 things you can touch or feel", 4),
                    PromptGroup::new("Hear", "Listen for 3 things you can hear", 3),
                    PromptGroup::new("Smell", "Find 2 things you can smell", 2),
                    PromptGroup::new("Taste", "Notice 1 thing you can taste", 1),
                ],
            },
        },
        ExerciseDefinition {
            id: "box_breathing".into(),
            name: "Box Breathing (4-4-4-4)".into(),
            category: ExerciseCategory::Breathing,
            summary: "Four equal sides: in, hold, out, hold. Repeat for four cycles.".into(),
            duration_hint_seconds: 64,
            body: ExerciseBody::Timed {
                steps: steps(&[
                    "Breathe in slowly through your nose for 4 seconds",
                    "Hold your breath for 4 seconds without tensing",
                    "Exhale slowly through your mouth for 4 seconds",
                    "Hold the empty breath for 4 seconds",
                ]),
                step_seconds: 4,
            },
        },
        ExerciseDefinition {
            id: "breathing_478".into(),
            name: "4-7-8 Breathing".into(),
            category: ExerciseCategory::Breathing,
            summary: "A longer hold and exhale for calming anxiety before rest.".into(),
            duration_hint_seconds: 76,
            body: ExerciseBody::Timed {
                steps: steps(&[
                    "Exhale completely through your mouth",
                    "Close your mouth and inhale quietly through your nose for 4 seconds",
                    "Hold your breath for 7 seconds",
                    "Exhale completely through your mouth for 8 seconds",
                ]),
                step_seconds: 6,
            },
        },
        ExerciseDefinition {
            id: "physiological_sigh".into(),
            name: "Physiological Sigh".into(),
            category: ExerciseCategory::Breathing,
            summary: "Double inhale, long exhale. The quickest way to settle in the moment.".into(),
            duration_hint_seconds: 30,
            body: ExerciseBody::Timed {
                steps: steps(&[
                    "Take a deep breath in through your nose",
                    "Take a second, shorter sip of air on top of the first",
                    "Let it all go with a long, slow exhale through your mouth",
                ]),
                step_seconds: 5,
            },
        },
        ExerciseDefinition {
            id: "body_scan".into(),
            name: "Body Scan".into(),
            category: ExerciseCategory::Mindfulness,
            summary: "Move your attention slowly from head to toe.".into(),
            duration_hint_seconds: 300,
            body: ExerciseBody::Guided {
                steps: steps(&[
                    "Sit or stand comfortably and close your eyes if it is safe to",
                    "Notice your head, jaw and shoulders. Let any tension soften",
                    "Move your attention to your chest and stomach as you breathe",
                    "Notice your arms and hands, then your legs and feet",
                    "Take one full breath and open your eyes when you are ready",
                ]),
            },
        },
        ExerciseDefinition {
            id: "muscle_relaxation".into(),
            name: "Progressive Muscle Relaxation".into(),
            category: ExerciseCategory::Relaxation,
            summary: "Tense and release each muscle group in turn.".into(),
            duration_hint_seconds: 420,
            body: ExerciseBody::Guided {
                steps: steps(&[
                    "Clench your fists for 5 seconds, then release",
                    "Tense your shoulders up towards your ears, then drop them",
                    "Scrunch your face tightly, then let it relax",
                    "Tighten your stomach muscles, then release",
                    "Press your feet into the floor, then let go",
                    "Notice how your whole body feels now",
                ]),
            },
        },
        ExerciseDefinition {
            id: "name_the_feeling".into(),
            name: "Name the Feeling".into(),
            category: ExerciseCategory::Grounding,
            summary: "Put words to what you feel so it has less hold over you.".into(),
            duration_hint_seconds: 120,
            body: ExerciseBody::Guided {
                steps: steps(&[
                    "Pause and notice what you are feeling right now",
                    "Name the feeling in one word: angry, anxious, tired, low",
                    "Notice where you feel it in your body",
                    "Say to yourself: this is a feeling, and it will pass",
                ]),
            },
        },
    ];

    match Catalog::new(exercises) {
        Ok(catalog) => catalog,
        Err(e) => panic!("built-in catalog is invalid: {}", e),
    }
}
