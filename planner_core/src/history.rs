//! Workout history log.
//!
//! Completed workouts are appended to a JSONL (JSON Lines) file under an
//! exclusive file lock so concurrent CLI invocations cannot interleave lines.

use crate::{CompletedWorkout, Result};
use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Destination for completed workouts
pub trait HistorySink {
    fn append(&mut self, workout: &CompletedWorkout) -> Result<()>;
}

/// JSONL-backed history with file locking
pub struct JsonlHistory {
    path: PathBuf,
}

impl JsonlHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySink for JsonlHistory {
    fn append(&mut self, workout: &CompletedWorkout) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(workout)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended workout {} to history", workout.id);
        Ok(())
    }
}

/// Read every completed workout from a history file.
///
/// Lines that fail to parse are logged and skipped.
pub fn read_history(path: &Path) -> Result<Vec<CompletedWorkout>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut workouts = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<CompletedWorkout>(&line) {
            Ok(workout) => workouts.push(workout),
            Err(e) => {
                tracing::warn!("Failed to parse history at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} workouts from history", workouts.len());
    Ok(workouts)
}

/// Workouts completed within the last `days` days of `now`, newest first
pub fn recent(
    history: &[CompletedWorkout],
    now: DateTime<Utc>,
    days: i64,
) -> Vec<&CompletedWorkout> {
    let cutoff = now - Duration::days(days);
    let mut recent: Vec<&CompletedWorkout> = history
        .iter()
        .filter(|w| w.completed_at >= cutoff && w.completed_at <= now)
        .collect();
    recent.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    recent
}
