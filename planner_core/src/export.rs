//! CSV export of logged set results.
//!
//! Each completed set becomes one row, so the file can be opened directly
//! in a spreadsheet for progress tracking.

use crate::{CompletedWorkout, Result};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct SetRow {
    pub workout_log_id: String,
    pub workout_name: String,
    pub completed_at: String,
    pub exercise: String,
    pub set_number: usize,
    pub unit: String,
    pub target: u32,
    pub value: u32,
    pub weight: Option<f64>,
    pub completed: bool,
}

/// Flatten a completed workout into one row per set
pub fn rows_for(workout: &CompletedWorkout) -> Vec<SetRow> {
    let completed_at = workout.completed_at.to_rfc3339();
    workout
        .exercises
        .iter()
        .flat_map(|log| {
            let completed_at = completed_at.clone();
            log.sets.iter().enumerate().map(move |(i, set)| SetRow {
                workout_log_id: workout.id.to_string(),
                workout_name: workout.workout_name.clone(),
                completed_at: completed_at.clone(),
                exercise: log.exercise_name.clone(),
                set_number: i + 1,
                unit: log.target.unit().to_string(),
                target: log.target.value(),
                value: set.value,
                weight: set.weight,
                completed: set.completed,
            })
        })
        .collect()
}

/// Append every set of `history` to the CSV at `csv_path`.
///
/// Headers are written only when the file is new or empty. The file is
/// synced before returning. Returns the number of rows written.
pub fn export_sets(history: &[CompletedWorkout], csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(&file);

    let mut count = 0;
    for workout in history {
        for row in rows_for(workout) {
            writer.serialize(&row)?;
            count += 1;
        }
    }
    writer.flush()?;
    drop(writer);
    file.sync_all()?;

    tracing::info!("Exported {} set rows to {:?}", count, csv_path);
    Ok(count)
}
