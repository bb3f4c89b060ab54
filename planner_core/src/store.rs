//! Persistence collaborators: the read-only workout library and the
//! per-user routine store.
//!
//! Routine snapshots are written whole with file locking and an atomic
//! rename, so a reader never sees a half-written routine.

use crate::config::RoutineConfig;
use crate::routine::RoutineSnapshot;
use crate::{Error, Result, Routine, Workout};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

// ============================================================================
// Workout Lookup
// ============================================================================

/// Read-only access to workouts owned by the workout store
pub trait WorkoutLookup {
    fn workout(&self, id: &str) -> Option<&Workout>;
}

impl WorkoutLookup for HashMap<String, Workout> {
    fn workout(&self, id: &str) -> Option<&Workout> {
        self.get(id)
    }
}

/// Workouts loaded from a JSON array on disk
#[derive(Clone, Debug, Default)]
pub struct WorkoutLibrary {
    workouts: Vec<Workout>,
}

impl WorkoutLibrary {
    pub fn new(workouts: Vec<Workout>) -> Self {
        Self { workouts }
    }

    /// Load workouts from a JSON file.
    ///
    /// A missing file is an empty library. A malformed file is an error,
    /// since silently dropping the user's workouts would hide the problem.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No workout library at {:?}, starting empty", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let workouts: Vec<Workout> = serde_json::from_str(&contents)?;

        for exercise in workouts.iter().flat_map(|w| &w.exercises) {
            if let Err(e) = exercise.attribution.validate() {
                tracing::warn!("Exercise {:?} has a bad attribution: {}", exercise.name, e);
            }
        }

        tracing::debug!("Loaded {} workouts from {:?}", workouts.len(), path);
        Ok(Self { workouts })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.workouts)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    /// Find a workout by id, falling back to a case-insensitive name match
    pub fn find(&self, id_or_name: &str) -> Option<&Workout> {
        self.workout(id_or_name).or_else(|| {
            self.workouts
                .iter()
                .find(|w| w.name.eq_ignore_ascii_case(id_or_name))
        })
    }
}

impl WorkoutLookup for WorkoutLibrary {
    fn workout(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }
}

// ============================================================================
// Routine Store
// ============================================================================

/// Whole-snapshot routine persistence keyed by user identity
pub trait RoutineStore {
    /// Latest saved routine for `user`, if any
    fn load(&self, user: &str) -> Result<Option<Routine>>;

    /// Replace the saved routine for `user`
    fn save(&mut self, user: &str, routine: &Routine) -> Result<()>;
}

/// One JSON snapshot per user under a directory
pub struct FileRoutineStore {
    dir: PathBuf,
}

impl FileRoutineStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the snapshot file for `user`
    pub fn path_for(&self, user: &str) -> Result<PathBuf> {
        let valid = !user.is_empty()
            && user
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !user.starts_with('.');
        if !valid {
            return Err(Error::invalid(format!("invalid user id {:?}", user)));
        }
        Ok(self.dir.join(format!("{}.json", user)))
    }

    /// Saved routine for `user`, or a fresh one built from `defaults`
    pub fn load_or_new(&self, user: &str, defaults: &RoutineConfig) -> Result<Routine> {
        match self.load(user)? {
            Some(routine) => Ok(routine),
            None => defaults.new_routine(),
        }
    }

    /// Load, modify and save a user's routine.
    ///
    /// Starts from an empty routine with the configured cycle count when
    /// nothing is saved yet. Nothing is written if `f` fails.
    pub fn update<F>(&mut self, user: &str, defaults: &RoutineConfig, f: F) -> Result<Routine>
    where
        F: FnOnce(&mut Routine) -> Result<()>,
    {
        let mut routine = self.load_or_new(user, defaults)?;
        f(&mut routine)?;
        self.save(user, &routine)?;
        Ok(routine)
    }
}

impl RoutineStore for FileRoutineStore {
    /// Missing, unreadable or corrupt snapshots load as `None` with a warning
    fn load(&self, user: &str) -> Result<Option<Routine>> {
        let path = self.path_for(user)?;
        if !path.exists() {
            tracing::info!("No saved routine for {}", user);
            return Ok(None);
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open routine file {:?}: {}. Ignoring it.", path, e);
                return Ok(None);
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock routine file {:?}: {}. Ignoring it.", path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        if let Err(e) = read {
            tracing::warn!("Failed to read routine file {:?}: {}. Ignoring it.", path, e);
            return Ok(None);
        }

        let snapshot = match serde_json::from_str::<RoutineSnapshot>(&contents) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Failed to parse routine file {:?}: {}. Ignoring it.", path, e);
                return Ok(None);
            }
        };

        match Routine::try_from(snapshot) {
            Ok(routine) => {
                tracing::debug!("Loaded routine for {} from {:?}", user, path);
                Ok(Some(routine))
            }
            Err(e) => {
                tracing::warn!("Saved routine {:?} is invalid: {}. Ignoring it.", path, e);
                Ok(None)
            }
        }
    }

    fn save(&mut self, user: &str, routine: &Routine) -> Result<()> {
        let path = self.path_for(user)?;
        std::fs::create_dir_all(&self.dir)?;

        // Temp file in the same directory so the rename stays atomic
        let temp = NamedTempFile::new_in(&self.dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(&RoutineSnapshot::from(routine))?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved routine for {} to {:?}", user, path);
        Ok(())
    }
}
