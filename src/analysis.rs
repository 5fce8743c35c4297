//! Analysis orchestration for the workout log.
//!
//! Ties the scoring primitives together per snapshot: per-exercise
//! statistics and relative-strength scores, current-phase progress,
//! and this week's per-muscle-group set volume.

use chrono::{NaiveDate, Weekday};
use rayon::prelude::*;

use crate::catalog::{self, Benchmark, Exercise};
use crate::domain::{DataPoint, LoggedSet, Phase, Sex, WorkoutLog};
use crate::formulas::estimate_one_rep_max;
use crate::progress::{PhaseProgress, phase_progress};
use crate::strength::{ScoringConfig, StrengthScore, score_bodyweight_ratio, score_reps};
use crate::volume::{MuscleGroupSets, aggregate_weekly_sets, count_sets_in_week};

/// Settings that shape an analysis run, fixed at startup.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub sex: Sex,
    pub scoring: ScoringConfig,
    pub weekly_target: u32,
}

/// Statistics for a single exercise with logged sets.
#[derive(Debug)]
pub struct ExerciseStats {
    pub exercise: &'static Exercise,
    /// Best estimated 1RM across all logged sets.
    pub best_one_rm: f64,
    /// The set that produced `best_one_rm`.
    pub best_set: LoggedSet,
    /// Highest single-set repetition count.
    pub max_reps: u32,
    /// Session-best e1RM per training day, sorted by date.
    pub one_rm_history: Vec<DataPoint>,
    pub last_set_date: NaiveDate,
    pub total_sets: usize,
    /// Relative-strength score; `None` when no scoring path is
    /// available (e.g. ratio benchmark without a bodyweight sample).
    pub score: Option<StrengthScore>,
}

/// The current phase together with its computed progress.
#[derive(Debug, Clone)]
pub struct PhaseSummary {
    pub phase: Phase,
    pub progress: PhaseProgress,
}

/// Complete analysis of one workout-log snapshot.
#[derive(Debug)]
pub struct LogAnalysis {
    /// Per-exercise stats in catalog order; only exercises with data.
    pub exercises: Vec<ExerciseStats>,
    /// Zero-filled weekly set counts in canonical group order.
    pub weekly_volume: Vec<MuscleGroupSets>,
    pub weekly_target: u32,
    /// Monday of the week the volume covers.
    pub week_start: NaiveDate,
    pub phase: Option<PhaseSummary>,
    pub bodyweight_kg: Option<f64>,
}

impl LogAnalysis {
    /// Returns the stats for an exercise by canonical name.
    pub fn stats_for(&self, name: &str) -> Option<&ExerciseStats> {
        let exercise = catalog::find(name)?;
        self.exercises
            .iter()
            .find(|s| std::ptr::eq(s.exercise, exercise))
    }
}

/// Analyzes one log snapshot.
///
/// Pure with respect to its inputs: "today" is a parameter, so
/// identical snapshots always produce identical analyses.
pub fn analyze_workout_log(
    log: &WorkoutLog,
    sex: Sex,
    config: &ScoringConfig,
    weekly_target: u32,
    today: NaiveDate,
) -> LogAnalysis {
    let bodyweight_kg = log.latest_bodyweight().map(|s| s.weight_kg);

    // Exercises are independent, so score them in parallel.
    let exercises: Vec<ExerciseStats> = catalog::all()
        .par_iter()
        .filter_map(|exercise| {
            let sets = log.sets_for(exercise.name)?;
            analyze_exercise(exercise, sets, bodyweight_kg, sex, config)
        })
        .collect();

    let week_start = today.week(Weekday::Mon).first_day();
    let weekly_volume = aggregate_weekly_sets(&count_sets_in_week(log, week_start));

    let phase = log.current_phase(today).map(|phase| PhaseSummary {
        phase: phase.clone(),
        progress: phase_progress(phase, bodyweight_kg, today),
    });

    LogAnalysis {
        exercises,
        weekly_volume,
        weekly_target,
        week_start,
        phase,
        bodyweight_kg,
    }
}

/// Computes stats and score for one exercise.
///
/// `sets` must be sorted by date (the `WorkoutLog` invariant).
fn analyze_exercise(
    exercise: &'static Exercise,
    sets: &[LoggedSet],
    bodyweight_kg: Option<f64>,
    sex: Sex,
    config: &ScoringConfig,
) -> Option<ExerciseStats> {
    let last = sets.last()?;

    let mut best_one_rm = 0.0;
    let mut best_set = sets[0].clone();
    let mut max_reps = 0;
    let mut one_rm_history: Vec<DataPoint> = Vec::new();

    for set in sets {
        let e1rm = estimate_one_rep_max(set.weight_kg, set.reps);

        if e1rm > best_one_rm {
            best_one_rm = e1rm;
            best_set = set.clone();
        }
        max_reps = max_reps.max(set.reps);

        // Collapse to session-best per training day.
        match one_rm_history.last_mut() {
            Some(point) if point.date == set.date => {
                if e1rm > point.value {
                    point.value = e1rm;
                }
            }
            _ => one_rm_history.push(DataPoint {
                date: set.date,
                value: e1rm,
            }),
        }
    }

    let score = match exercise.benchmark {
        Benchmark::BodyweightRatio(elite_ratio) => bodyweight_kg
            .and_then(|bw| score_bodyweight_ratio(best_one_rm, bw, elite_ratio, sex, config)),
        Benchmark::Reps(elite_reps) => score_reps(max_reps, elite_reps, sex, config),
    };

    Some(ExerciseStats {
        exercise,
        best_one_rm,
        best_set,
        max_reps,
        one_rm_history,
        last_set_date: last.date,
        total_sets: sets.len(),
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MuscleGroup, WeightSample};
    use crate::strength::ScoreBand;

    fn make_date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn set(date: NaiveDate, weight_kg: f64, reps: u32) -> LoggedSet {
        LoggedSet {
            date,
            weight_kg,
            reps,
        }
    }

    fn weight(date: NaiveDate, weight_kg: f64) -> WeightSample {
        WeightSample { date, weight_kg }
    }

    #[test]
    fn test_analyze_exercise_best_set_and_history() {
        let exercise = catalog::find("back squat").unwrap();
        let sets = vec![
            set(make_date(2024, 1, 1), 100.0, 5),  // e1RM 116.67
            set(make_date(2024, 1, 1), 110.0, 1),  // e1RM 110, same day
            set(make_date(2024, 1, 8), 105.0, 5),  // e1RM 122.5
            set(make_date(2024, 1, 15), 100.0, 3), // e1RM 110
        ];

        let stats =
            analyze_exercise(exercise, &sets, Some(80.0), Sex::Male, &ScoringConfig::default())
                .unwrap();

        assert!((stats.best_one_rm - 122.5).abs() < 0.01);
        assert_eq!(stats.best_set.date, make_date(2024, 1, 8));
        assert_eq!(stats.max_reps, 5);
        assert_eq!(stats.total_sets, 4);
        assert_eq!(stats.last_set_date, make_date(2024, 1, 15));

        // Three training days, session-best per day.
        assert_eq!(stats.one_rm_history.len(), 3);
        assert!((stats.one_rm_history[0].value - 116.67).abs() < 0.01);
        assert!((stats.one_rm_history[1].value - 122.5).abs() < 0.01);
    }

    #[test]
    fn test_analyze_exercise_ratio_score_needs_bodyweight() {
        let exercise = catalog::find("back squat").unwrap();
        let sets = vec![set(make_date(2024, 1, 1), 150.0, 1)];

        let with_bw =
            analyze_exercise(exercise, &sets, Some(80.0), Sex::Male, &ScoringConfig::default())
                .unwrap();
        assert!(with_bw.score.is_some());
        // 150/80 = 1.875 of 2.5 -> 75.
        assert_eq!(with_bw.score.unwrap().score, 75);

        let without_bw =
            analyze_exercise(exercise, &sets, None, Sex::Male, &ScoringConfig::default()).unwrap();
        assert!(without_bw.score.is_none());
    }

    #[test]
    fn test_analyze_exercise_rep_score_ignores_bodyweight() {
        let exercise = catalog::find("pull-up").unwrap();
        let sets = vec![
            set(make_date(2024, 1, 1), 80.0, 10),
            set(make_date(2024, 1, 8), 80.0, 15),
        ];

        // No bodyweight sample needed for the rep path.
        let stats =
            analyze_exercise(exercise, &sets, None, Sex::Male, &ScoringConfig::default()).unwrap();

        let score = stats.score.unwrap();
        assert_eq!(score.score, 60); // 15 of 25
        assert_eq!(score.band(), ScoreBand::Intermediate);
    }

    #[test]
    fn test_analyze_workout_log_full() {
        let today = make_date(2024, 1, 10); // A Wednesday.
        let rows = vec![
            ("back squat", set(make_date(2024, 1, 8), 140.0, 3)),
            ("back squat", set(make_date(2024, 1, 8), 140.0, 3)),
            ("bench press", set(make_date(2024, 1, 9), 100.0, 5)),
            // Previous week, outside the volume window.
            ("deadlift", set(make_date(2024, 1, 5), 180.0, 2)),
        ];
        let weights = vec![
            weight(make_date(2024, 1, 1), 82.0),
            weight(make_date(2024, 1, 9), 80.0),
        ];
        let phases = vec![Phase {
            start_date: make_date(2024, 1, 1),
            end_date: Some(make_date(2024, 1, 21)),
            starting_weight_kg: 82.0,
            weight_goal_kg: Some(78.0),
        }];
        let log = WorkoutLog::from_parts(rows, weights, phases);

        let analysis =
            analyze_workout_log(&log, Sex::Male, &ScoringConfig::default(), 10, today);

        // Catalog order: back squat before bench press before deadlift.
        assert_eq!(analysis.exercises.len(), 3);
        assert_eq!(analysis.exercises[0].exercise.name, "back squat");
        assert_eq!(analysis.exercises[1].exercise.name, "bench press");
        assert_eq!(analysis.exercises[2].exercise.name, "deadlift");

        assert_eq!(analysis.bodyweight_kg, Some(80.0));
        assert_eq!(analysis.week_start, make_date(2024, 1, 8));

        // Volume covers only this week's sets: 2 legs, 1 chest.
        let legs = analysis
            .weekly_volume
            .iter()
            .find(|g| g.muscle_group == MuscleGroup::Legs)
            .unwrap();
        assert_eq!(legs.count, 2);
        let back = analysis
            .weekly_volume
            .iter()
            .find(|g| g.muscle_group == MuscleGroup::Back)
            .unwrap();
        assert_eq!(back.count, 0);

        // Phase: 9 of 20 days elapsed, 2kg of 4kg lost.
        let phase = analysis.phase.unwrap();
        assert_eq!(phase.progress.time, Some(0.45));
        assert_eq!(phase.progress.weight, Some(0.5));
    }

    #[test]
    fn test_analyze_workout_log_empty() {
        let log = WorkoutLog::default();
        let analysis = analyze_workout_log(
            &log,
            Sex::Male,
            &ScoringConfig::default(),
            10,
            make_date(2024, 1, 10),
        );

        assert!(analysis.exercises.is_empty());
        assert!(analysis.phase.is_none());
        assert!(analysis.bodyweight_kg.is_none());
        // Volume is still complete and zero-filled.
        assert_eq!(analysis.weekly_volume.len(), MuscleGroup::all().len());
        assert!(analysis.weekly_volume.iter().all(|g| g.count == 0));
    }

    #[test]
    fn test_stats_for_resolves_aliases() {
        let rows = vec![("back squat", set(make_date(2024, 1, 8), 140.0, 3))];
        let log = WorkoutLog::from_parts(rows, Vec::new(), Vec::new());
        let analysis = analyze_workout_log(
            &log,
            Sex::Male,
            &ScoringConfig::default(),
            10,
            make_date(2024, 1, 10),
        );

        assert!(analysis.stats_for("squat").is_some());
        assert!(analysis.stats_for("back-squat").is_some());
        assert!(analysis.stats_for("bench press").is_none());
    }
}
