//! Relative-strength scoring against elite benchmarks.
//!
//! Maps a lifter's best performance to a 0-100 score by comparing it
//! with the exercise's elite benchmark, scaled for female lifters.
//! Ratio-benchmarked exercises compare e1RM / bodyweight; rep-
//! benchmarked exercises compare repetition counts directly.

use crate::domain::Sex;

/// Default scale applied to elite benchmarks for female lifters.
///
/// Calibrated against sex-split strength-standard tables; override
/// with `--female-scale` if a different reference dataset is in use.
pub const DEFAULT_FEMALE_BENCHMARK_SCALE: f64 = 0.66;

/// Tunable scoring parameters.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Multiplier applied to elite benchmarks when scoring female lifters.
    pub female_benchmark_scale: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            female_benchmark_scale: DEFAULT_FEMALE_BENCHMARK_SCALE,
        }
    }
}

/// A computed relative-strength score.
///
/// `scaled_benchmark` is the sex-adjusted elite reference the score
/// was measured against, so callers can display "scored against a
/// 1.65x bodyweight benchmark".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrengthScore {
    pub score: u8,
    pub scaled_benchmark: f64,
}

impl StrengthScore {
    /// Returns the display band for this score.
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }
}

/// Display bands driving the dashboard's colors and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Elite,
    Advanced,
    Intermediate,
    Novice,
    Beginner,
    NonLifter,
}

impl ScoreBand {
    /// Maps a 0-100 score to its band.
    pub fn from_score(score: u8) -> Self {
        match score {
            95..=100 => ScoreBand::Elite,
            75..=94 => ScoreBand::Advanced,
            50..=74 => ScoreBand::Intermediate,
            35..=49 => ScoreBand::Novice,
            20..=34 => ScoreBand::Beginner,
            _ => ScoreBand::NonLifter,
        }
    }

    /// Returns the display label for the band.
    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Elite => "Elite",
            ScoreBand::Advanced => "Advanced",
            ScoreBand::Intermediate => "Intermediate",
            ScoreBand::Novice => "Novice",
            ScoreBand::Beginner => "Beginner",
            ScoreBand::NonLifter => "Non-lifter",
        }
    }
}

/// Applies the sex adjustment to an elite benchmark.
fn scaled_benchmark(elite: f64, sex: Sex, config: &ScoringConfig) -> f64 {
    match sex {
        Sex::Male => elite,
        Sex::Female => elite * config.female_benchmark_scale,
    }
}

/// Converts an achieved/elite ratio pair into a clamped integer score.
fn score_from_ratio(actual: f64, scaled_elite: f64) -> u8 {
    (actual / scaled_elite * 100.0).clamp(0.0, 100.0).round() as u8
}

/// Scores a bodyweight-ratio-benchmarked exercise.
///
/// `best_one_rm / bodyweight_kg` is compared against the sex-adjusted
/// elite ratio. Returns `None` for degenerate inputs (non-positive
/// bodyweight or benchmark) rather than producing NaN.
pub fn score_bodyweight_ratio(
    best_one_rm: f64,
    bodyweight_kg: f64,
    elite_ratio: f64,
    sex: Sex,
    config: &ScoringConfig,
) -> Option<StrengthScore> {
    if bodyweight_kg <= 0.0 || elite_ratio <= 0.0 {
        return None;
    }

    let scaled = scaled_benchmark(elite_ratio, sex, config);
    if scaled <= 0.0 {
        return None;
    }

    let actual = best_one_rm / bodyweight_kg;
    Some(StrengthScore {
        score: score_from_ratio(actual, scaled),
        scaled_benchmark: scaled,
    })
}

/// Scores a rep-benchmarked exercise (pull-ups, dips, ...).
///
/// The achieved repetition count is compared against the sex-adjusted
/// elite count; bodyweight does not enter the ratio.
pub fn score_reps(
    max_reps: u32,
    elite_reps: u32,
    sex: Sex,
    config: &ScoringConfig,
) -> Option<StrengthScore> {
    if elite_reps == 0 {
        return None;
    }

    let scaled = scaled_benchmark(elite_reps as f64, sex, config);
    if scaled <= 0.0 {
        return None;
    }

    Some(StrengthScore {
        score: score_from_ratio(max_reps as f64, scaled),
        scaled_benchmark: scaled,
    })
}
