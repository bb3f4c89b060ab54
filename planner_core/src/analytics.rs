//! Progress analytics over workouts and workout history.
//!
//! Everything here is a pure function of the supplied data and a `now`
//! timestamp, so reports are reproducible in tests.

use crate::catalog::{default_catalog, ExerciseCatalog};
use crate::distribution::{aggregate_by_frequency, Aggregator, DistributionSummary};
use crate::{CompletedWorkout, Config, Workout};
use chrono::{DateTime, Duration, Utc};

/// Number of weeks covered by the consistency chart
pub const WEEKS_TRACKED: i64 = 4;

/// Completed workouts in one seven-day window
#[derive(Clone, Debug, PartialEq)]
pub struct WeeklyBucket {
    /// "Week 1" is the oldest window
    pub label: String,
    pub start: DateTime<Utc>,
    pub workouts: usize,
    pub exercises: usize,
}

/// Summary shown on the analytics screen
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyticsReport {
    pub total_workouts: usize,
    pub total_exercises: usize,
    pub completed_last_30_days: usize,
    pub completed_this_week: usize,
    pub kind_distribution: Vec<(String, usize)>,
    pub top_exercises: Vec<(String, usize)>,
    pub weekly: Vec<WeeklyBucket>,
    pub avg_per_week: f64,
    /// Average of the last two weeks minus the average of the first two
    pub weekly_trend: f64,
    pub consistency_score: i64,
    pub muscle_distribution: DistributionSummary,
}

/// The `n` exercises appearing in the most workouts
pub fn top_exercises(workouts: &[Workout], n: usize) -> Vec<(String, usize)> {
    aggregate_by_frequency(
        workouts.iter().flat_map(|w| &w.exercises),
        |exercise| exercise.name.clone(),
        n,
    )
}

/// Workout count per kind, most common first
pub fn kind_distribution(workouts: &[Workout]) -> Vec<(String, usize)> {
    aggregate_by_frequency(workouts, |w| w.kind_or_default().to_string(), usize::MAX)
}

/// Completed workouts in each of the last four weeks, oldest first
pub fn weekly_consistency(history: &[CompletedWorkout], now: DateTime<Utc>) -> Vec<WeeklyBucket> {
    (0..WEEKS_TRACKED)
        .rev()
        .map(|i| {
            let start = now - Duration::weeks(i + 1);
            let end = now - Duration::weeks(i);
            let in_week: Vec<&CompletedWorkout> = history
                .iter()
                .filter(|w| w.completed_at >= start && w.completed_at < end)
                .collect();
            WeeklyBucket {
                label: format!("Week {}", WEEKS_TRACKED - i),
                start,
                workouts: in_week.len(),
                exercises: in_week.iter().map(|w| w.exercises.len()).sum(),
            }
        })
        .collect()
}

/// `this_week / weekly_target` as a percentage, capped at 100
pub fn consistency_score(this_week: usize, weekly_target: u32) -> i64 {
    if weekly_target == 0 {
        return 100;
    }
    let score = (this_week as f64 / f64::from(weekly_target) * 100.0 + 0.5).floor() as i64;
    score.min(100)
}

/// Build the full analytics report
pub fn build_report(
    workouts: &[Workout],
    history: &[CompletedWorkout],
    now: DateTime<Utc>,
    config: &Config,
) -> AnalyticsReport {
    let weekly = weekly_consistency(history, now);
    let count_since = |days: i64| {
        let cutoff = now - Duration::days(days);
        history
            .iter()
            .filter(|w| w.completed_at >= cutoff && w.completed_at <= now)
            .count()
    };
    let completed_this_week = count_since(7);

    let avg = |buckets: &[WeeklyBucket]| {
        buckets.iter().map(|b| b.workouts as f64).sum::<f64>() / buckets.len().max(1) as f64
    };
    let half = weekly.len() / 2;
    let weekly_trend = avg(&weekly[half..]) - avg(&weekly[..half]);

    let aggregator = config.distribution.aggregator().unwrap_or_default();
    let muscle_distribution = aggregator.aggregate(
        workouts
            .iter()
            .flat_map(|w| &w.exercises)
            .map(|e| default_catalog().attribution_for(e)),
    );

    let report = AnalyticsReport {
        total_workouts: workouts.len(),
        total_exercises: workouts.iter().map(|w| w.exercises.len()).sum(),
        completed_last_30_days: count_since(30),
        completed_this_week,
        kind_distribution: kind_distribution(workouts),
        top_exercises: top_exercises(workouts, config.analytics.top_exercises),
        avg_per_week: avg(&weekly),
        weekly_trend,
        weekly,
        consistency_score: consistency_score(completed_this_week, config.analytics.weekly_target),
        muscle_distribution,
    };

    tracing::debug!(
        "Analytics: {} workouts, {} completed this week, score {}",
        report.total_workouts,
        report.completed_this_week,
        report.consistency_score
    );
    report
}

/// Muscle distribution for a single workout using the configured aggregator
pub fn workout_distribution(
    workout: &Workout,
    aggregator: &Aggregator,
    catalog: &ExerciseCatalog,
) -> DistributionSummary {
    aggregator.aggregate(workout.exercises.iter().map(|e| catalog.attribution_for(e)))
}
