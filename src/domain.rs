//! Domain types for workout log data.

use chrono::NaiveDate;
use std::collections::HashMap;

/// Muscle groups tracked for weekly set volume.
///
/// The variant order here is the canonical display order for the
/// volume rings; `all()` must stay in sync with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Legs,
    Biceps,
    Triceps,
    Core,
}

impl MuscleGroup {
    /// Returns all tracked muscle groups in display order.
    pub fn all() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Legs,
            MuscleGroup::Biceps,
            MuscleGroup::Triceps,
            MuscleGroup::Core,
        ]
    }

    /// Returns the display name for the muscle group.
    pub fn display_name(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Back => "Back",
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Legs => "Legs",
            MuscleGroup::Biceps => "Biceps",
            MuscleGroup::Triceps => "Triceps",
            MuscleGroup::Core => "Core",
        }
    }

    /// Returns the lowercase identifier used in API routes and JSON.
    pub fn id(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Legs => "legs",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Core => "core",
        }
    }
}

impl std::fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Lifter sex, used to scale elite benchmarks.
///
/// Always passed explicitly into the scoring functions; the analytics
/// core never reads it from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Sex {
    Male,
    Female,
}

/// One logged set: a weight lifted for a number of repetitions.
///
/// The loader guarantees `weight_kg > 0` and `reps >= 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedSet {
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub reps: u32,
}

/// A bodyweight measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSample {
    pub date: NaiveDate,
    pub weight_kg: f64,
}

/// A bulk/cut/maintain phase with an optional end date and weight goal.
///
/// The loader guarantees `end_date > start_date` when present.
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub starting_weight_kg: f64,
    pub weight_goal_kg: Option<f64>,
}

/// A dated value for charting series (e1RM history, bodyweight trend).
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Immutable snapshot of everything in the workout log.
///
/// Built once per (re)load and handed to the analytics functions;
/// nothing here is mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct WorkoutLog {
    sets: HashMap<&'static str, Vec<LoggedSet>>,
    weights: Vec<WeightSample>,
    phases: Vec<Phase>,
}

impl WorkoutLog {
    /// Builds a log from loader output. Sets are grouped by exercise
    /// and everything is sorted by date.
    pub fn from_parts(
        set_rows: Vec<(&'static str, LoggedSet)>,
        mut weights: Vec<WeightSample>,
        mut phases: Vec<Phase>,
    ) -> Self {
        let mut sets: HashMap<&'static str, Vec<LoggedSet>> = HashMap::new();
        for (exercise, set) in set_rows {
            sets.entry(exercise).or_default().push(set);
        }
        for entries in sets.values_mut() {
            entries.sort_by_key(|s| s.date);
        }
        weights.sort_by_key(|w| w.date);
        phases.sort_by_key(|p| p.start_date);

        Self {
            sets,
            weights,
            phases,
        }
    }

    /// Returns the logged sets for an exercise, sorted by date.
    pub fn sets_for(&self, exercise: &str) -> Option<&[LoggedSet]> {
        self.sets.get(exercise).map(|v| v.as_slice())
    }

    /// Iterates over (exercise, sets) pairs.
    pub fn iter_sets(&self) -> impl Iterator<Item = (&'static str, &[LoggedSet])> {
        self.sets.iter().map(|(name, sets)| (*name, sets.as_slice()))
    }

    /// Returns the total number of logged sets across all exercises.
    pub fn total_sets(&self) -> usize {
        self.sets.values().map(|v| v.len()).sum()
    }

    /// Returns the most recent bodyweight sample.
    pub fn latest_bodyweight(&self) -> Option<&WeightSample> {
        self.weights.last()
    }

    /// Returns the phase relevant for `today`: the most recent one
    /// that has started. An elapsed phase still counts (its progress
    /// simply reads as complete).
    pub fn current_phase(&self, today: NaiveDate) -> Option<&Phase> {
        self.phases.iter().rev().find(|p| p.start_date <= today)
    }

    /// Returns the overall date range across sets and bodyweights.
    pub fn overall_date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut min_date: Option<NaiveDate> = None;
        let mut max_date: Option<NaiveDate> = None;

        let all_dates = self
            .sets
            .values()
            .flatten()
            .map(|s| s.date)
            .chain(self.weights.iter().map(|w| w.date));

        for date in all_dates {
            min_date = Some(min_date.map_or(date, |d| d.min(date)));
            max_date = Some(max_date.map_or(date, |d| d.max(date)));
        }

        min_date.zip(max_date)
    }
}
