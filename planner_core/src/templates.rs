//! Built-in routine templates.
//!
//! A template is a named day pattern such as Push / Pull / Legs / Rest.
//! Applying one builds a routine from the user's own workouts by matching
//! pattern day names against workout names.

use crate::store::WorkoutLibrary;
use crate::{Result, Routine, RoutineItem, REST_LABEL};

/// Difficulty a template is aimed at
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

/// A named rotation pattern
#[derive(Clone, Debug)]
pub struct RoutineTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub pattern: &'static [&'static str],
    pub level: Level,
}

pub const TEMPLATES: &[RoutineTemplate] = &[
    RoutineTemplate {
        name: "Push/Pull/Legs",
        description: "3-day split focusing on different muscle groups",
        pattern: &["Push Day", "Pull Day", "Leg Day", "Rest"],
        level: Level::Intermediate,
    },
    RoutineTemplate {
        name: "Upper/Lower Split",
        description: "4-day split alternating upper and lower body",
        pattern: &[
            "Upper Body",
            "Lower Body",
            "Rest",
            "Upper Body",
            "Lower Body",
            "Rest",
            "Rest",
        ],
        level: Level::Beginner,
    },
    RoutineTemplate {
        name: "Full Body 3x",
        description: "Full body workouts 3 times per week",
        pattern: &[
            "Full Body",
            "Rest",
            "Full Body",
            "Rest",
            "Full Body",
            "Rest",
            "Rest",
        ],
        level: Level::Beginner,
    },
    RoutineTemplate {
        name: "Arnold Split",
        description: "6-day split popularized by Arnold Schwarzenegger",
        pattern: &[
            "Chest/Back",
            "Shoulders/Arms",
            "Legs",
            "Chest/Back",
            "Shoulders/Arms",
            "Legs",
            "Rest",
        ],
        level: Level::Advanced,
    },
];

/// Find a template by name, ignoring case
pub fn find_template(name: &str) -> Option<&'static RoutineTemplate> {
    TEMPLATES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

impl RoutineTemplate {
    pub fn days_per_cycle(&self) -> usize {
        self.pattern.len()
    }

    /// Build a routine repeating `cycle_count` times from this pattern.
    ///
    /// "Rest" becomes a rest slot; every other day name is matched against
    /// workout names ignoring case. Days with no matching workout are
    /// skipped. A day name appearing twice yields two slots.
    pub fn apply(&self, library: &WorkoutLibrary, cycle_count: u32) -> Result<Routine> {
        let mut items = Vec::with_capacity(self.pattern.len());

        for day in self.pattern {
            if day.eq_ignore_ascii_case(REST_LABEL) {
                items.push(RoutineItem::rest());
                continue;
            }
            match library
                .workouts()
                .iter()
                .find(|w| w.name.eq_ignore_ascii_case(day))
            {
                Some(workout) => items.push(RoutineItem::workout(&workout.id, &workout.name)),
                None => tracing::warn!(
                    "Template {:?}: no workout named {:?}, skipping that day",
                    self.name,
                    day
                ),
            }
        }

        tracing::info!(
            "Applied template {:?}: {} of {} days",
            self.name,
            items.len(),
            self.pattern.len()
        );
        Routine::from_parts(items, cycle_count)
    }
}
