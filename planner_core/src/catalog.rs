//! Default exercise attribution catalog.
//!
//! Maps exercise names to the muscle groups they train. The catalog is
//! static data handed whole to the distribution aggregator.

use crate::distribution::MuscleAttribution;
use crate::{Error, Exercise, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A catalog exercise with its primary group and attribution
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    /// Group the exercise is listed under in the library
    pub group: String,
    pub attribution: MuscleAttribution,
}

/// Exercise library keyed by exercise name
#[derive(Clone, Debug, Default)]
pub struct ExerciseCatalog {
    entries: Vec<CatalogEntry>,
    by_name: HashMap<String, usize>,
}

/// Cached default catalog - built once and reused
static DEFAULT_CATALOG: Lazy<ExerciseCatalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn default_catalog() -> &'static ExerciseCatalog {
    &DEFAULT_CATALOG
}

impl ExerciseCatalog {
    /// Add an entry. A later entry with the same name replaces the earlier one.
    pub fn insert(&mut self, entry: CatalogEntry) {
        match self.by_name.get(&entry.name) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.by_name.insert(entry.name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn attribution(&self, name: &str) -> Option<&MuscleAttribution> {
        self.lookup(name).map(|entry| &entry.attribution)
    }

    /// The exercise's own attribution, or the catalog's when it has none
    pub fn attribution_for<'a>(&'a self, exercise: &'a Exercise) -> &'a MuscleAttribution {
        if exercise.attribution.is_empty() {
            if let Some(known) = self.attribution(&exercise.name) {
                return known;
            }
        }
        &exercise.attribution
    }

    /// Entries listed under `group`, in catalog order
    pub fn by_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries.iter().filter(move |e| e.group == group)
    }

    /// Distinct groups in catalog order
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !groups.contains(&entry.group.as_str()) {
                groups.push(&entry.group);
            }
        }
        groups
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every attribution, collecting all problems
    pub fn validate(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry
                    .attribution
                    .validate()
                    .err()
                    .map(|e| format!("{}: {}", entry.name, e))
            })
            .collect()
    }

    /// Like [`validate`](Self::validate) but as a single error
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::CatalogValidation(errors.join("; ")))
        }
    }
}

fn entry(group: &str, name: &str, groups: &[&str], weights: &[f64]) -> CatalogEntry {
    CatalogEntry {
        name: name.into(),
        group: group.into(),
        attribution: MuscleAttribution {
            categories: groups.iter().map(|g| g.to_string()).collect(),
            weights: weights.to_vec(),
        },
    }
}

/// Builds the default catalog
pub fn build_default_catalog() -> ExerciseCatalog {
    let mut catalog = ExerciseCatalog::default();

    let single = |group: &str, names: &[&str], catalog: &mut ExerciseCatalog| {
        for name in names {
            catalog.insert(entry(group, name, &[group], &[100.0]));
        }
    };

    single(
        "Back",
        &["Cross-Body Lat Pull-Around"],
        &mut catalog,
    );
    catalog.insert(entry(
        "Back",
        "Seated DB Shoulder Press",
        &["Back", "Shoulders"],
        &[60.0, 40.0],
    ));
    catalog.insert(entry(
        "Back",
        "Paused Barbell RDL",
        &["Back", "Legs"],
        &[60.0, 40.0],
    ));
    single(
        "Back",
        &[
            "Chest-Supported Machine Row",
            "Assisted Pull-Up",
            "Neutral-Grip Lat Pulldown",
        ],
        &mut catalog,
    );
    single(
        "Chest",
        &["Low Incline Smith Machine Press", "Bent-Over Cable Pec Flye"],
        &mut catalog,
    );
    single(
        "Legs",
        &[
            "Machine Hip Adduction",
            "Leg Press",
            "Seated Leg Curl",
            "Leg Extension",
            "Lying Leg Curl",
            "Hack Squat",
            "Leg Press Calf Press",
            "Standing Calf Raise",
        ],
        &mut catalog,
    );
    single(
        "Shoulders",
        &[
            "Cuffed Behind-The-Back Lateral Raise",
            "Cable Paused Shrug-In",
            "Cable Reverse Flye",
        ],
        &mut catalog,
    );
    single(
        "Triceps",
        &[
            "Overhead Cable Triceps Extension",
            "Paused Assisted Dip",
            "Triceps Pressdown",
            "Cable Triceps Kickback",
        ],
        &mut catalog,
    );
    single(
        "Abs",
        &["Lying Paused Rope Face Pull", "Cable Crunch", "Roman Chair Leg Raise"],
        &mut catalog,
    );
    single(
        "Biceps",
        &[
            "Hammer Preacher Curl",
            "Bayesian Cable Curl",
            "Constant Tension Preacher Curl",
        ],
        &mut catalog,
    );

    tracing::trace!("Built default exercise catalog ({} entries)", catalog.len());
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::aggregate;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = build_default_catalog();
        assert!(catalog.validate().is_empty());
        assert!(catalog.ensure_valid().is_ok());
        assert_eq!(catalog.len(), 29);
    }

    #[test]
    fn test_cached_catalog_matches_built() {
        assert_eq!(default_catalog().len(), build_default_catalog().len());
    }

    #[test]
    fn test_lookup_compound_exercise() {
        let catalog = default_catalog();
        let rdl = catalog.attribution("Paused Barbell RDL").unwrap();
        assert_eq!(rdl.categories, vec!["Back", "Legs"]);
        assert_eq!(rdl.weights, vec![60.0, 40.0]);
        assert!(catalog.lookup("Bench Press").is_none());
    }

    #[test]
    fn test_groups_in_order() {
        let groups = default_catalog().groups();
        assert_eq!(
            groups,
            vec!["Back", "Chest", "Legs", "Shoulders", "Triceps", "Abs", "Biceps"]
        );
        assert_eq!(default_catalog().by_group("Chest").count(), 2);
    }

    #[test]
    fn test_invalid_entry_reported() {
        let mut catalog = ExerciseCatalog::default();
        catalog.insert(entry("Back", "Broken", &["Back", "Legs"], &[100.0]));

        assert_eq!(catalog.validate().len(), 1);
        assert!(matches!(
            catalog.ensure_valid(),
            Err(Error::CatalogValidation(_))
        ));
    }

    #[test]
    fn test_attribution_for_falls_back_to_catalog() {
        let catalog = default_catalog();
        let mut exercise = Exercise {
            id: "e1".into(),
            name: "Leg Press".into(),
            sets: 3,
            target: crate::ExerciseTarget::Reps { reps: 12 },
            weight: None,
            rest_seconds: 90,
            attribution: MuscleAttribution::default(),
        };

        assert_eq!(catalog.attribution_for(&exercise).categories, vec!["Legs"]);

        exercise.attribution = MuscleAttribution::single("Glutes");
        assert_eq!(catalog.attribution_for(&exercise).categories, vec!["Glutes"]);
    }

    #[test]
    fn test_catalog_feeds_aggregator() {
        let catalog = default_catalog();
        let day = ["Paused Barbell RDL", "Chest-Supported Machine Row", "Leg Press"];

        let summary = aggregate(day.iter().filter_map(|name| catalog.attribution(name)));

        // Back 160, Legs 140 out of 300
        assert_eq!(summary.top_categories, vec!["Back", "Legs"]);
        assert_eq!(summary.top_weights, vec![53, 47]);
    }
}
