//! Weekly set-volume aggregation per muscle group.
//!
//! Raw counting only sees muscle groups that were actually trained;
//! the aggregation step guarantees a complete, ordered, zero-filled
//! result so the dashboard rings always show every tracked group.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::catalog;
use crate::domain::{MuscleGroup, WorkoutLog};

/// Default weekly set target per muscle group.
pub const DEFAULT_WEEKLY_SET_TARGET: u32 = 10;

/// Set count for one muscle group in one week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuscleGroupSets {
    pub muscle_group: MuscleGroup,
    pub count: u32,
}

/// Counts logged sets per muscle group for the week starting at
/// `week_start` (inclusive, seven days).
pub fn count_sets_in_week(log: &WorkoutLog, week_start: NaiveDate) -> HashMap<MuscleGroup, u32> {
    let week_end = week_start + Duration::days(6);
    let mut counts: HashMap<MuscleGroup, u32> = HashMap::new();

    for (name, sets) in log.iter_sets() {
        let Some(exercise) = catalog::find(name) else {
            continue;
        };

        let in_week = sets
            .iter()
            .filter(|s| s.date >= week_start && s.date <= week_end)
            .count() as u32;

        if in_week > 0 {
            *counts.entry(exercise.muscle_group).or_insert(0) += in_week;
        }
    }

    counts
}

/// Expands raw counts into one entry per tracked muscle group, in
/// canonical display order, with zero for groups not trained.
pub fn aggregate_weekly_sets(raw: &HashMap<MuscleGroup, u32>) -> Vec<MuscleGroupSets> {
    MuscleGroup::all()
        .iter()
        .map(|&muscle_group| MuscleGroupSets {
            muscle_group,
            count: raw.get(&muscle_group).copied().unwrap_or(0),
        })
        .collect()
}

/// Ring fill fraction for the volume display: `count / target`,
/// capped at 1.0. A zero target counts as met.
pub fn ring_fraction(count: u32, target: u32) -> f64 {
    if target == 0 {
        return 1.0;
    }

    (count as f64 / target as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LoggedSet;

    fn make_date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn set(date: NaiveDate) -> LoggedSet {
        LoggedSet {
            date,
            weight_kg: 100.0,
            reps: 5,
        }
    }

    #[test]
    fn test_aggregate_fills_gaps_in_order() {
        let mut raw = HashMap::new();
        raw.insert(MuscleGroup::Chest, 12);

        let aggregated = aggregate_weekly_sets(&raw);

        assert_eq!(aggregated.len(), MuscleGroup::all().len());
        assert_eq!(aggregated[0].muscle_group, MuscleGroup::Chest);
        assert_eq!(aggregated[0].count, 12);
        assert_eq!(aggregated[1].muscle_group, MuscleGroup::Back);
        assert_eq!(aggregated[1].count, 0);
        assert!(aggregated[2..].iter().all(|g| g.count == 0));
    }

    #[test]
    fn test_aggregate_ring_fractions() {
        let mut raw = HashMap::new();
        raw.insert(MuscleGroup::Chest, 12);

        let aggregated = aggregate_weekly_sets(&raw);
        let fractions: Vec<f64> = aggregated
            .iter()
            .map(|g| ring_fraction(g.count, DEFAULT_WEEKLY_SET_TARGET))
            .collect();

        // 12 of 10 caps at 1.0, everything else is empty.
        assert_eq!(fractions[0], 1.0);
        assert!(fractions[1..].iter().all(|&f| f == 0.0));
    }

    #[test]
    fn test_ring_fraction_partial() {
        assert_eq!(ring_fraction(5, 10), 0.5);
        assert_eq!(ring_fraction(10, 10), 1.0);
        assert_eq!(ring_fraction(0, 10), 0.0);
    }

    #[test]
    fn test_ring_fraction_zero_target() {
        assert_eq!(ring_fraction(3, 0), 1.0);
    }

    #[test]
    fn test_count_sets_in_week_window() {
        let monday = make_date(2024, 1, 8);
        let rows = vec![
            // Inside the week.
            ("back squat", set(monday)),
            ("back squat", set(monday + Duration::days(2))),
            ("bench press", set(monday + Duration::days(6))),
            // Outside the week.
            ("back squat", set(monday - Duration::days(1))),
            ("bench press", set(monday + Duration::days(7))),
        ];
        let log = WorkoutLog::from_parts(rows, Vec::new(), Vec::new());

        let counts = count_sets_in_week(&log, monday);

        assert_eq!(counts.get(&MuscleGroup::Legs), Some(&2));
        assert_eq!(counts.get(&MuscleGroup::Chest), Some(&1));
        assert_eq!(counts.get(&MuscleGroup::Back), None);
    }

    #[test]
    fn test_count_sets_sums_exercises_of_same_group() {
        let monday = make_date(2024, 1, 8);
        let rows = vec![
            ("deadlift", set(monday)),
            ("barbell row", set(monday + Duration::days(1))),
            ("pull-up", set(monday + Duration::days(3))),
        ];
        let log = WorkoutLog::from_parts(rows, Vec::new(), Vec::new());

        let counts = count_sets_in_week(&log, monday);

        assert_eq!(counts.get(&MuscleGroup::Back), Some(&3));
    }

    #[test]
    fn test_count_sets_empty_log() {
        let log = WorkoutLog::default();
        assert!(count_sets_in_week(&log, make_date(2024, 1, 8)).is_empty());
    }
}
