//! The routine model: an ordered rotation of workout and rest slots that
//! repeats for a number of cycles.
//!
//! The selected-workout set is never stored on [`Routine`]; it is recomputed
//! from `items` so the two cannot drift apart. Only the persisted
//! [`RoutineSnapshot`] carries it, for consumers that expect the field.

use crate::distribution::aggregate_by_frequency;
use crate::store::WorkoutLookup;
use crate::{Error, Result, RoutineItem, Workout};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of cycles a fresh routine repeats for
pub const DEFAULT_CYCLE_COUNT: u32 = 4;

/// A user-defined rotation of workout/rest slots
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Routine {
    items: Vec<RoutineItem>,
    cycle_count: u32,
}

impl Default for Routine {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cycle_count: DEFAULT_CYCLE_COUNT,
        }
    }
}

impl Routine {
    /// Create an empty routine repeating `cycle_count` times
    pub fn new(cycle_count: u32) -> Result<Self> {
        check_cycle_count(cycle_count)?;
        Ok(Self {
            items: Vec::new(),
            cycle_count,
        })
    }

    /// Build a routine from existing slots
    pub fn from_parts(items: Vec<RoutineItem>, cycle_count: u32) -> Result<Self> {
        check_cycle_count(cycle_count)?;
        Ok(Self { items, cycle_count })
    }

    pub fn items(&self) -> &[RoutineItem] {
        &self.items
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Workout ids referenced by the routine, in order of first appearance
    pub fn selected_workout_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for id in self.items.iter().filter_map(RoutineItem::workout_id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn is_selected(&self, workout_id: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.workout_id() == Some(workout_id))
    }

    /// Append a workout slot unless the workout is already selected.
    ///
    /// Returns `true` if a slot was added.
    pub fn add_workout(&mut self, workout_id: &str, label: &str) -> bool {
        if self.is_selected(workout_id) {
            tracing::debug!("Workout {} already in routine, ignoring add", workout_id);
            return false;
        }
        self.items.push(RoutineItem::workout(workout_id, label));
        tracing::debug!("Added workout {} ({}) to routine", workout_id, label);
        true
    }

    /// Remove every slot referencing `workout_id`.
    ///
    /// Returns the number of slots removed.
    pub fn remove_workout(&mut self, workout_id: &str) -> usize {
        let before = self.items.len();
        self.items
            .retain(|item| item.workout_id() != Some(workout_id));
        let removed = before - self.items.len();
        tracing::debug!("Removed {} slot(s) for workout {}", removed, workout_id);
        removed
    }

    /// Append a rest slot and return its id
    pub fn add_rest_day(&mut self) -> Uuid {
        let item = RoutineItem::rest();
        let id = item.id;
        self.items.push(item);
        tracing::debug!("Added rest day {}", id);
        id
    }

    /// Remove the slot with the given id, if present
    pub fn remove_item(&mut self, item_id: Uuid) -> Option<RoutineItem> {
        let index = self.items.iter().position(|item| item.id == item_id)?;
        let removed = self.items.remove(index);
        tracing::debug!("Removed slot {} ({})", item_id, removed.label());
        Some(removed)
    }

    /// Insert a copy of the slot at `index` directly after it.
    ///
    /// The copy gets a fresh id. Returns that id.
    pub fn duplicate_item(&mut self, index: usize) -> Result<Uuid> {
        let original = self.items.get(index).ok_or_else(|| {
            Error::invalid(format!(
                "duplicate index {} out of range for {} items",
                index,
                self.items.len()
            ))
        })?;
        let copy = RoutineItem {
            id: Uuid::new_v4(),
            kind: original.kind.clone(),
        };
        let id = copy.id;
        self.items.insert(index + 1, copy);
        Ok(id)
    }

    /// Move the slot at `from` so that it ends up at `to`.
    ///
    /// The slot is removed first and then inserted into the shortened list,
    /// so moving 0 to 2 in `[A, B, C, D]` gives `[B, C, A, D]`.
    pub fn reorder_items(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.items.len();
        if from >= len || to >= len {
            return Err(Error::invalid(format!(
                "cannot move slot {} to {} in a routine of {} items",
                from, to, len
            )));
        }
        if from == to {
            return Ok(());
        }
        let moved = self.items.remove(from);
        self.items.insert(to, moved);
        tracing::debug!("Moved slot from {} to {}", from, to);
        Ok(())
    }

    pub fn set_cycle_count(&mut self, cycle_count: u32) -> Result<()> {
        check_cycle_count(cycle_count)?;
        self.cycle_count = cycle_count;
        Ok(())
    }

    /// Number of scheduled days across all cycles
    pub fn total_days(&self) -> usize {
        self.items.len() * self.cycle_count as usize
    }

    /// Enumerate every scheduled day, cycle by cycle.
    ///
    /// The iterator is lazy and can be cloned to restart from the current
    /// position. An empty routine yields nothing.
    pub fn project_to_days(&self) -> ScheduleIter<'_> {
        ScheduleIter {
            items: &self.items,
            next: 0,
            total: self.total_days(),
        }
    }

    /// The scheduled day at an absolute index, if within the horizon
    pub fn day(&self, absolute_day_index: usize) -> Option<ScheduledDay<'_>> {
        if absolute_day_index >= self.total_days() {
            return None;
        }
        Some(ScheduledDay::at(&self.items, absolute_day_index))
    }

    pub fn stats(&self) -> RoutineStats {
        let rest_days = self.items.iter().filter(|item| item.is_rest()).count();
        RoutineStats {
            days_per_cycle: self.items.len(),
            workout_days: self.items.len() - rest_days,
            rest_days,
            total_days: self.total_days(),
        }
    }

    /// Count workout slots per workout kind, most common first.
    ///
    /// Slots whose workout no longer exists are skipped.
    pub fn workout_kind_counts<L>(&self, lookup: &L) -> Vec<(String, usize)>
    where
        L: WorkoutLookup + ?Sized,
    {
        let workouts = self
            .items
            .iter()
            .filter_map(|item| item.workout_id())
            .filter_map(|id| lookup.workout(id));
        aggregate_by_frequency(workouts, |w| w.kind_or_default().to_string(), usize::MAX)
    }
}

fn check_cycle_count(cycle_count: u32) -> Result<()> {
    if cycle_count == 0 {
        return Err(Error::invalid("cycle count must be at least 1"));
    }
    Ok(())
}

/// Per-cycle summary of a routine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoutineStats {
    pub days_per_cycle: usize,
    pub workout_days: usize,
    pub rest_days: usize,
    pub total_days: usize,
}

/// One slot of a routine placed in the overall schedule
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledDay<'a> {
    pub cycle_index: usize,
    pub item_index: usize,
    pub absolute_day_index: usize,
    pub item: &'a RoutineItem,
}

impl<'a> ScheduledDay<'a> {
    fn at(items: &'a [RoutineItem], absolute_day_index: usize) -> Self {
        let len = items.len();
        let item_index = absolute_day_index % len;
        Self {
            cycle_index: absolute_day_index / len,
            item_index,
            absolute_day_index,
            item: &items[item_index],
        }
    }

    /// Look up the workout this day refers to.
    ///
    /// `None` for rest days and for references the store no longer knows.
    pub fn resolve<'w, L>(&self, lookup: &'w L) -> Option<&'w Workout>
    where
        L: WorkoutLookup + ?Sized,
    {
        self.item.workout_id().and_then(|id| lookup.workout(id))
    }

    /// Name to show for this day.
    ///
    /// Prefers the live workout name; a dangling reference falls back to the
    /// label cached when the slot was added.
    pub fn display_label<L>(&self, lookup: &L) -> String
    where
        L: WorkoutLookup + ?Sized,
    {
        match self.item.workout_id() {
            None => self.item.label().to_string(),
            Some(id) => match lookup.workout(id) {
                Some(workout) => workout.name.clone(),
                None => {
                    tracing::debug!("Workout {} missing from store, using cached label", id);
                    self.item.label().to_string()
                }
            },
        }
    }
}

/// Lazy row-major walk over a routine's schedule
#[derive(Clone, Debug)]
pub struct ScheduleIter<'a> {
    items: &'a [RoutineItem],
    next: usize,
    total: usize,
}

impl<'a> Iterator for ScheduleIter<'a> {
    type Item = ScheduledDay<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let day = ScheduledDay::at(self.items, self.next);
        self.next += 1;
        Some(day)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ScheduleIter<'_> {}

// ============================================================================
// Persistence Snapshot
// ============================================================================

/// Whole-routine snapshot as written to durable storage
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoutineSnapshot {
    pub selected_workout_ids: Vec<String>,
    pub items: Vec<RoutineItem>,
    pub cycle_count: u32,
}

impl From<&Routine> for RoutineSnapshot {
    fn from(routine: &Routine) -> Self {
        Self {
            selected_workout_ids: routine
                .selected_workout_ids()
                .into_iter()
                .map(String::from)
                .collect(),
            items: routine.items.clone(),
            cycle_count: routine.cycle_count,
        }
    }
}

impl TryFrom<RoutineSnapshot> for Routine {
    type Error = Error;

    fn try_from(snapshot: RoutineSnapshot) -> Result<Self> {
        let routine = Routine::from_parts(snapshot.items, snapshot.cycle_count)?;

        let derived = routine.selected_workout_ids();
        let stored_matches = derived.len() == snapshot.selected_workout_ids.len()
            && snapshot
                .selected_workout_ids
                .iter()
                .all(|id| derived.contains(&id.as_str()));
        if !stored_matches {
            tracing::warn!(
                "Stored workout selection {:?} disagrees with routine slots {:?}; using slots",
                snapshot.selected_workout_ids,
                derived
            );
        }

        Ok(routine)
    }
}
