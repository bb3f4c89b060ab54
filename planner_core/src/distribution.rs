//! Aggregation of weighted categorical data into display percentages.
//!
//! The main entry point is [`aggregate`]: exercises attribute relative
//! weight to muscle groups, the weights are summed across exercises, and the
//! result is a top-K breakdown plus an "Other" bucket whose integer
//! percentages always sum to exactly 100.
//!
//! ## Rounding
//!
//! Every bucket is rounded half-up on its own. Whatever the rounding loses
//! or gains is then added in full to the largest rounded bucket (the first
//! one on ties), so only the most significant bucket is distorted.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Label of the remainder bucket
pub const OTHER_LABEL: &str = "Other";

/// Number of named buckets kept before the remainder
pub const DEFAULT_TOP_K: usize = 3;

// ============================================================================
// Attribution
// ============================================================================

/// Relative weights with which an exercise trains each muscle group
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MuscleAttribution {
    pub categories: Vec<String>,
    pub weights: Vec<f64>,
}

impl MuscleAttribution {
    /// Build an attribution, checking that the lists line up and that every
    /// weight is a finite, non-negative number
    pub fn new(categories: Vec<String>, weights: Vec<f64>) -> Result<Self> {
        let attribution = Self {
            categories,
            weights,
        };
        attribution.validate()?;
        Ok(attribution)
    }

    /// A single category carrying the full weight
    pub fn single(category: impl Into<String>) -> Self {
        Self {
            categories: vec![category.into()],
            weights: vec![100.0],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.categories.len() != self.weights.len() {
            return Err(Error::invalid(format!(
                "{} categories but {} weights",
                self.categories.len(),
                self.weights.len()
            )));
        }
        if let Some(bad) = self.weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(Error::invalid(format!("invalid weight {}", bad)));
        }
        Ok(())
    }

    /// `(category, weight)` pairs in declaration order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.categories
            .iter()
            .map(String::as_str)
            .zip(self.weights.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Normalized top-K-plus-remainder breakdown
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistributionSummary {
    pub top_categories: Vec<String>,
    pub top_weights: Vec<i64>,
    /// Present iff more than `top_k` categories contributed
    pub other_weight: Option<i64>,
}

impl DistributionSummary {
    pub fn is_empty(&self) -> bool {
        self.top_categories.is_empty() && self.other_weight.is_none()
    }

    pub fn other_label(&self) -> Option<&'static str> {
        self.other_weight.map(|_| OTHER_LABEL)
    }

    /// Sum of all buckets; 100 for any non-empty summary
    pub fn total(&self) -> i64 {
        self.top_weights.iter().sum::<i64>() + self.other_weight.unwrap_or(0)
    }

    /// Every bucket in display order, "Other" last
    pub fn entries(&self) -> Vec<(&str, i64)> {
        let mut entries: Vec<(&str, i64)> = self
            .top_categories
            .iter()
            .map(String::as_str)
            .zip(self.top_weights.iter().copied())
            .collect();
        if let Some(other) = self.other_weight {
            entries.push((OTHER_LABEL, other));
        }
        entries
    }
}

/// Ordering among categories with equal weight
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the order in which categories were first seen
    #[default]
    FirstSeen,
    /// Order tied categories by name
    Alphabetical,
}

/// Configurable distribution aggregator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aggregator {
    top_k: usize,
    tie_break: TieBreak,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            tie_break: TieBreak::FirstSeen,
        }
    }
}

impl Aggregator {
    pub fn new(top_k: usize, tie_break: TieBreak) -> Result<Self> {
        if top_k == 0 {
            return Err(Error::invalid("top_k must be at least 1"));
        }
        Ok(Self { top_k, tie_break })
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Aggregate attributions into a summary summing to 100.
    ///
    /// No input, or input whose weights are all zero, gives an empty summary.
    pub fn aggregate<'a, I>(&self, attributions: I) -> DistributionSummary
    where
        I: IntoIterator<Item = &'a MuscleAttribution>,
    {
        let (totals, grand_total) = accumulate(attributions);
        if grand_total <= 0.0 {
            return DistributionSummary::default();
        }

        let mut ranked: Vec<(String, f64)> = totals
            .into_iter()
            .map(|(category, weight)| (category, weight / grand_total * 100.0))
            .collect();

        // sort_by is stable, so equal percentages keep first-seen order
        let tie_break = self.tie_break;
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| match tie_break {
                    TieBreak::FirstSeen => std::cmp::Ordering::Equal,
                    TieBreak::Alphabetical => a.0.cmp(&b.0),
                })
        });

        let remainder = if ranked.len() > self.top_k {
            Some(ranked[self.top_k..].iter().map(|(_, pct)| pct).sum::<f64>())
        } else {
            None
        };
        ranked.truncate(self.top_k);

        let mut rounded: Vec<i64> = ranked.iter().map(|(_, pct)| round_half_up(*pct)).collect();
        if let Some(other) = remainder {
            rounded.push(round_half_up(other));
        }
        correct_remainder(&mut rounded);

        let other_weight = remainder.map(|_| rounded.pop().unwrap_or_default());

        tracing::trace!(
            "Aggregated {} categories (other: {:?})",
            ranked.len(),
            other_weight
        );

        DistributionSummary {
            top_categories: ranked.into_iter().map(|(category, _)| category).collect(),
            top_weights: rounded,
            other_weight,
        }
    }
}

/// Aggregate with the default top-3, first-seen aggregator
pub fn aggregate<'a, I>(attributions: I) -> DistributionSummary
where
    I: IntoIterator<Item = &'a MuscleAttribution>,
{
    Aggregator::default().aggregate(attributions)
}

/// Sum weights per category in first-seen order
fn accumulate<'a, I>(attributions: I) -> (Vec<(String, f64)>, f64)
where
    I: IntoIterator<Item = &'a MuscleAttribution>,
{
    let mut totals: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut grand_total = 0.0;

    for attribution in attributions {
        for (category, weight) in attribution.pairs() {
            if !weight.is_finite() || weight < 0.0 {
                tracing::warn!("Ignoring invalid weight {} for {}", weight, category);
                continue;
            }
            match index.get(category) {
                Some(&i) => totals[i].1 += weight,
                None => {
                    index.insert(category.to_string(), totals.len());
                    totals.push((category.to_string(), weight));
                }
            }
            grand_total += weight;
        }
    }

    (totals, grand_total)
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Add `100 - sum` to the first largest bucket
fn correct_remainder(values: &mut [i64]) {
    if values.is_empty() {
        return;
    }
    let diff = 100 - values.iter().sum::<i64>();
    if diff == 0 {
        return;
    }
    let mut max_index = 0;
    for (i, value) in values.iter().enumerate() {
        if *value > values[max_index] {
            max_index = i;
        }
    }
    values[max_index] += diff;
}

// ============================================================================
// Body Region Split
// ============================================================================

/// Coarse body region a muscle group belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyRegion {
    Upper,
    Lower,
    Core,
}

impl BodyRegion {
    /// Region for a muscle group; unknown groups have none
    pub fn of(category: &str) -> Option<Self> {
        match category {
            "Chest" | "Triceps" | "Back" | "Biceps" | "Shoulders" => Some(BodyRegion::Upper),
            "Legs" => Some(BodyRegion::Lower),
            "Abs" => Some(BodyRegion::Core),
            _ => None,
        }
    }
}

/// Upper/lower/core percentages
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionSplit {
    pub upper: i64,
    pub lower: i64,
    pub core: i64,
}

/// Split attributed weight into upper body, lower body and core.
///
/// Weight on groups outside the three regions still counts toward the
/// total. When the rounded regions do not add up to 100 the difference goes
/// to upper if it is at least as large as both others, else to lower if it is
/// at least core, else to core.
pub fn region_split<'a, I>(attributions: I) -> RegionSplit
where
    I: IntoIterator<Item = &'a MuscleAttribution>,
{
    let (totals, grand_total) = accumulate(attributions);
    if grand_total <= 0.0 {
        return RegionSplit::default();
    }

    let (mut upper, mut lower, mut core) = (0.0, 0.0, 0.0);
    for (category, weight) in &totals {
        match BodyRegion::of(category) {
            Some(BodyRegion::Upper) => upper += weight,
            Some(BodyRegion::Lower) => lower += weight,
            Some(BodyRegion::Core) => core += weight,
            None => {}
        }
    }

    let mut split = RegionSplit {
        upper: round_half_up(upper / grand_total * 100.0),
        lower: round_half_up(lower / grand_total * 100.0),
        core: round_half_up(core / grand_total * 100.0),
    };

    let total = split.upper + split.lower + split.core;
    if total != 100 && total > 0 {
        let diff = 100 - total;
        if split.upper >= split.lower && split.upper >= split.core {
            split.upper += diff;
        } else if split.lower >= split.core {
            split.lower += diff;
        } else {
            split.core += diff;
        }
    }

    split
}

// ============================================================================
// Frequency Ranking
// ============================================================================

/// Count occurrences per key and return the `n` most frequent.
///
/// Sorted by count descending; equal counts keep first-seen order.
pub fn aggregate_by_frequency<I, K, F>(items: I, mut key_fn: F, n: usize) -> Vec<(K, usize)>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> K,
    K: Eq + Hash + Clone,
{
    let mut counts: Vec<(K, usize)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();

    for item in items {
        let key = key_fn(&item);
        match index.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}
