//! Guided workout execution.
//!
//! [`ExecutionCursor`] walks `(exercise, set)` pairs of a workout in order
//! and ends in a terminal [`Position::Complete`] state. [`WorkoutSession`]
//! pairs the cursor with the set results being logged and produces a
//! [`CompletedWorkout`] at the end.

use crate::{CompletedWorkout, Error, Exercise, ExerciseLog, Result, SetResult, Workout};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Where the cursor currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    At { exercise: usize, set: usize },
    Complete,
}

/// Linear cursor over the sets of a workout
#[derive(Clone, Debug)]
pub struct ExecutionCursor {
    set_counts: Vec<u32>,
    position: Position,
}

impl ExecutionCursor {
    /// Create a cursor for exercises with the given set counts.
    ///
    /// Every exercise needs at least one set. With no exercises at all the
    /// cursor starts out complete.
    pub fn new(set_counts: Vec<u32>) -> Result<Self> {
        if let Some(index) = set_counts.iter().position(|&sets| sets == 0) {
            return Err(Error::invalid(format!("exercise {} has no sets", index)));
        }
        let position = if set_counts.is_empty() {
            Position::Complete
        } else {
            Position::At {
                exercise: 0,
                set: 0,
            }
        };
        Ok(Self {
            set_counts,
            position,
        })
    }

    pub fn for_workout(workout: &Workout) -> Result<Self> {
        Self::new(workout.exercises.iter().map(|e| e.sets).collect())
    }

    pub fn exercise_count(&self) -> usize {
        self.set_counts.len()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_complete(&self) -> bool {
        self.position == Position::Complete
    }

    /// Move to the next set, the next exercise, or completion
    pub fn advance(&mut self) -> Position {
        if let Position::At { exercise, set } = self.position {
            let last_set = set + 1 >= self.set_counts[exercise] as usize;
            let last_exercise = exercise + 1 >= self.set_counts.len();

            self.position = match (last_set, last_exercise) {
                (true, true) => Position::Complete,
                (true, false) => Position::At {
                    exercise: exercise + 1,
                    set: 0,
                },
                (false, _) => Position::At {
                    exercise,
                    set: set + 1,
                },
            };
        }
        self.position
    }

    /// Step back one set. No-op at the first set and once complete.
    pub fn retreat(&mut self) -> Position {
        if let Position::At { exercise, set } = self.position {
            if set > 0 {
                self.position = Position::At {
                    exercise,
                    set: set - 1,
                };
            } else if exercise > 0 {
                self.position = Position::At {
                    exercise: exercise - 1,
                    set: self.set_counts[exercise - 1] as usize - 1,
                };
            }
        }
        self.position
    }

    pub fn total_sets(&self) -> u32 {
        self.set_counts.iter().sum()
    }

    /// Sets before the current position (all of them once complete)
    pub fn completed_sets(&self) -> u32 {
        match self.position {
            Position::At { exercise, set } => {
                self.set_counts[..exercise].iter().sum::<u32>() + set as u32
            }
            Position::Complete => self.total_sets(),
        }
    }

    /// Fraction of sets done, in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        let total = self.total_sets();
        if total == 0 {
            return 1.0;
        }
        f64::from(self.completed_sets()) / f64::from(total)
    }
}

/// A workout being executed, with its set results
#[derive(Debug)]
pub struct WorkoutSession<'w> {
    workout: &'w Workout,
    cursor: ExecutionCursor,
    results: Vec<Vec<SetResult>>,
    started_at: DateTime<Utc>,
}

impl<'w> WorkoutSession<'w> {
    /// Start a session; set results are pre-filled from each exercise's
    /// target and working weight
    pub fn start(workout: &'w Workout, started_at: DateTime<Utc>) -> Result<Self> {
        let cursor = ExecutionCursor::for_workout(workout)?;
        let results = workout
            .exercises
            .iter()
            .map(|exercise| {
                (0..exercise.sets)
                    .map(|_| SetResult {
                        weight: exercise.weight,
                        value: exercise.target.value(),
                        completed: false,
                    })
                    .collect()
            })
            .collect();

        tracing::info!(
            "Starting workout {} ({} sets)",
            workout.name,
            cursor.total_sets()
        );

        Ok(Self {
            workout,
            cursor,
            results,
            started_at,
        })
    }

    pub fn cursor(&self) -> &ExecutionCursor {
        &self.cursor
    }

    pub fn current_exercise(&self) -> Option<&'w Exercise> {
        match self.cursor.position() {
            Position::At { exercise, .. } => self.workout.exercises.get(exercise),
            Position::Complete => None,
        }
    }

    pub fn current_result(&self) -> Option<&SetResult> {
        match self.cursor.position() {
            Position::At { exercise, set } => self.results[exercise].get(set),
            Position::Complete => None,
        }
    }

    /// Overwrite what was actually lifted for the current set
    pub fn update_current(&mut self, weight: Option<f64>, value: u32) {
        if let Position::At { exercise, set } = self.cursor.position() {
            let result = &mut self.results[exercise][set];
            result.weight = weight;
            result.value = value;
        }
    }

    /// Mark the current set done and move on
    pub fn record_set(&mut self) -> Position {
        if let Position::At { exercise, set } = self.cursor.position() {
            self.results[exercise][set].completed = true;
            tracing::debug!("Completed set {} of exercise {}", set + 1, exercise + 1);
        }
        self.cursor.advance()
    }

    /// Go back to the previous set
    pub fn retreat(&mut self) -> Position {
        self.cursor.retreat()
    }

    /// Close the session, whether or not every set was done
    pub fn finish(self, completed_at: DateTime<Utc>) -> CompletedWorkout {
        let total = self.cursor.total_sets();
        let done = self.results.iter().flatten().filter(|r| r.completed).count() as u32;
        let completion_rate = if total == 0 {
            100.0
        } else {
            f64::from(done) / f64::from(total) * 100.0
        };

        tracing::info!(
            "Finished workout {}: {}/{} sets ({:.0}%)",
            self.workout.name,
            done,
            total,
            completion_rate
        );

        CompletedWorkout {
            id: Uuid::new_v4(),
            workout_id: self.workout.id.clone(),
            workout_name: self.workout.name.clone(),
            started_at: self.started_at,
            completed_at,
            completion_rate,
            exercises: self
                .workout
                .exercises
                .iter()
                .zip(self.results)
                .map(|(exercise, sets)| ExerciseLog {
                    exercise_name: exercise.name.clone(),
                    target: exercise.target,
                    sets,
                })
                .collect(),
        }
    }
}
