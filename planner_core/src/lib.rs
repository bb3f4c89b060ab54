#![forbid(unsafe_code)]

//! Core domain model and business logic for the rotation planner.
//!
//! This crate provides:
//! - Domain types (routine slots, workouts, exercises, set results)
//! - The routine model and its projection onto calendar dates
//! - Muscle distribution aggregation and frequency rankings
//! - Guided workout execution
//! - Persistence (routine snapshots, history log, CSV export)
//! - Analytics

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod distribution;
pub mod routine;
pub mod calendar;
pub mod sequencer;
pub mod templates;
pub mod catalog;
pub mod store;
pub mod history;
pub mod export;
pub mod analytics;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use distribution::{aggregate, Aggregator, DistributionSummary, MuscleAttribution, TieBreak};
pub use routine::{Routine, RoutineSnapshot, RoutineStats, ScheduledDay};
pub use calendar::date_for_day;
pub use sequencer::{ExecutionCursor, Position, WorkoutSession};
pub use catalog::default_catalog;
pub use store::{FileRoutineStore, RoutineStore, WorkoutLibrary, WorkoutLookup};
pub use history::{read_history, HistorySink, JsonlHistory};
