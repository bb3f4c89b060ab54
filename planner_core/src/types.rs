//! Core domain types for the rotation planner.
//!
//! This module defines the fundamental types used throughout the system:
//! - Routine slots (workout references and rest markers)
//! - Workouts and their exercises, owned by the external workout store
//! - Set results and completed-workout records produced during execution

use crate::distribution::MuscleAttribution;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label carried by every rest slot
pub const REST_LABEL: &str = "Rest";

/// Kind used when a workout carries no explicit kind
pub const DEFAULT_WORKOUT_KIND: &str = "mixed";

// ============================================================================
// Routine Types
// ============================================================================

/// What occupies a routine slot
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoutineItemKind {
    /// A reference to a workout owned by the workout store.
    /// `label` caches the workout name at the time the slot was added.
    Workout { workout_id: String, label: String },
    /// A rest day
    Rest,
}

/// A single slot in the rotation sequence
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutineItem {
    /// Stable across reorders
    pub id: Uuid,
    pub kind: RoutineItemKind,
}

impl RoutineItem {
    /// Create a workout slot with a fresh id
    pub fn workout(workout_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: RoutineItemKind::Workout {
                workout_id: workout_id.into(),
                label: label.into(),
            },
        }
    }

    /// Create a rest slot with a fresh id
    pub fn rest() -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: RoutineItemKind::Rest,
        }
    }

    /// Display label: the cached workout name, or "Rest"
    pub fn label(&self) -> &str {
        match &self.kind {
            RoutineItemKind::Workout { label, .. } => label,
            RoutineItemKind::Rest => REST_LABEL,
        }
    }

    /// Referenced workout id (None for rest slots)
    pub fn workout_id(&self) -> Option<&str> {
        match &self.kind {
            RoutineItemKind::Workout { workout_id, .. } => Some(workout_id),
            RoutineItemKind::Rest => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self.kind, RoutineItemKind::Rest)
    }
}

// ============================================================================
// Workout and Exercise Types
// ============================================================================

/// Whether an exercise is performed for repetitions or held for time
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExerciseTarget {
    Reps { reps: u32 },
    Time { seconds: u32 },
}

impl ExerciseTarget {
    /// The target value, in reps or seconds depending on the variant
    pub fn value(&self) -> u32 {
        match self {
            ExerciseTarget::Reps { reps } => *reps,
            ExerciseTarget::Time { seconds } => *seconds,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            ExerciseTarget::Reps { .. } => "reps",
            ExerciseTarget::Time { .. } => "s",
        }
    }
}

/// An exercise within a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub target: ExerciseTarget,
    /// Working weight, if the exercise is loaded
    #[serde(default)]
    pub weight: Option<f64>,
    /// Rest between sets
    #[serde(default)]
    pub rest_seconds: u32,
    #[serde(default)]
    pub attribution: MuscleAttribution,
}

/// A workout as supplied by the workout store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: String,
    pub name: String,
    /// Free-form kind such as "push", "pull" or "legs"
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Workout {
    pub fn kind_or_default(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_WORKOUT_KIND)
    }

    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }
}

// ============================================================================
// Execution Types
// ============================================================================

/// Outcome of a single set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetResult {
    pub weight: Option<f64>,
    /// Reps performed or seconds held, matching the exercise target
    pub value: u32,
    pub completed: bool,
}

/// Per-exercise results inside a completed workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseLog {
    pub exercise_name: String,
    pub target: ExerciseTarget,
    pub sets: Vec<SetResult>,
}

/// A finished (or abandoned) guided execution of a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompletedWorkout {
    pub id: Uuid,
    pub workout_id: String,
    pub workout_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Percentage of planned sets that were completed (0-100)
    pub completion_rate: f64,
    pub exercises: Vec<ExerciseLog>,
}

impl CompletedWorkout {
    pub fn duration_minutes(&self) -> i64 {
        (self.completed_at - self.started_at).num_minutes()
    }
}
