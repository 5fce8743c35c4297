//! Phase progress calculations.
//!
//! Time progress is the elapsed fraction of a bounded phase window;
//! weight progress is distance traveled toward the goal weight as a
//! fraction of total distance. Both round to two decimals for display.

use chrono::NaiveDate;

use crate::domain::Phase;
use crate::formulas::round2;

/// Fraction of the phase window that has elapsed, clamped to [0, 1].
///
/// A phase whose window has fully passed reads as complete; a phase
/// that has not started yet reads as zero.
pub fn time_progress(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> f64 {
    let days_in_phase = (end - start).num_days();
    if days_in_phase <= 0 {
        return 1.0;
    }

    let days_elapsed = (today - start).num_days();
    round2((days_elapsed as f64 / days_in_phase as f64).clamp(0.0, 1.0))
}

/// Fraction of the weight goal reached.
///
/// Sign-sensitive: for a cut (goal below start), losing weight moves
/// the ratio toward 1.0 just as gaining does for a bulk. Not clamped:
/// negative means moving away from the goal, above 1.0 means
/// overshoot, and both are shown as-is.
///
/// A goal equal to the starting weight counts as already reached.
pub fn weight_progress(starting_kg: f64, current_kg: f64, goal_kg: f64) -> f64 {
    let total = goal_kg - starting_kg;
    if total.abs() < f64::EPSILON {
        return 1.0;
    }

    round2((current_kg - starting_kg) / total)
}

/// Progress of a phase along both of its optional axes.
///
/// `None` on either axis means that axis is not active for the phase
/// (no end date, or no weight goal / no bodyweight sample), not an
/// error.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseProgress {
    pub time: Option<f64>,
    pub weight: Option<f64>,
}

/// Computes progress for a phase, guarding the optional fields.
pub fn phase_progress(
    phase: &Phase,
    current_weight_kg: Option<f64>,
    today: NaiveDate,
) -> PhaseProgress {
    let time = phase
        .end_date
        .map(|end| time_progress(phase.start_date, end, today));

    let weight = match (phase.weight_goal_kg, current_weight_kg) {
        (Some(goal), Some(current)) => {
            Some(weight_progress(phase.starting_weight_kg, current, goal))
        }
        _ => None,
    };

    PhaseProgress { time, weight }
}
