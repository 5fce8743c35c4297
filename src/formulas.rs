//! Strength formulas for one-rep-max estimation.

/// Estimates a one-rep max from a logged set using the Epley formula:
/// `weight * (1 + reps / 30)`.
///
/// For reps == 1, returns the weight directly (actual 1RM).
/// Out-of-domain inputs (zero or negative weight, zero reps) return
/// 0.0 so that no NaN or infinity ever reaches callers.
///
/// # Arguments
/// * `weight_kg` - Weight lifted in kilograms
/// * `reps` - Number of repetitions performed
///
/// # Returns
/// Estimated 1RM in kilograms
pub fn estimate_one_rep_max(weight_kg: f64, reps: u32) -> f64 {
    if weight_kg <= 0.0 {
        return 0.0;
    }

    if reps == 0 {
        return 0.0;
    }

    if reps == 1 {
        return weight_kg;
    }

    weight_kg * (1.0 + reps as f64 / 30.0)
}

/// Rounds to one decimal place (display convention for weights).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rounds to two decimal places (display convention for ratios).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to check floating point equality with tolerance
    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_e1rm_single_rep_identity() {
        // For 1 rep, the set weight is the 1RM.
        assert_eq!(estimate_one_rep_max(100.0, 1), 100.0);
        assert_eq!(estimate_one_rep_max(62.5, 1), 62.5);
        assert_eq!(estimate_one_rep_max(0.0, 1), 0.0);
    }

    #[test]
    fn test_e1rm_zero_reps() {
        assert_eq!(estimate_one_rep_max(100.0, 0), 0.0);
    }

    #[test]
    fn test_e1rm_nonpositive_weight() {
        assert_eq!(estimate_one_rep_max(0.0, 5), 0.0);
        assert_eq!(estimate_one_rep_max(-100.0, 5), 0.0);
    }

    #[test]
    fn test_e1rm_five_reps() {
        // 100kg x 5: 100 * (1 + 5/30) = 116.666..., displays as 116.7
        let e1rm = estimate_one_rep_max(100.0, 5);
        assert!(approx_eq(e1rm, 116.6667, 0.001));
        assert_eq!(round1(e1rm), 116.7);
    }

    #[test]
    fn test_e1rm_ten_reps() {
        // 100kg x 10: 100 * (1 + 10/30) = 133.333...
        let e1rm = estimate_one_rep_max(100.0, 10);
        assert!(approx_eq(e1rm, 133.3333, 0.001));
    }

    #[test]
    fn test_e1rm_strictly_increasing_in_reps() {
        let mut previous = 0.0;
        for reps in 1..=20 {
            let e1rm = estimate_one_rep_max(100.0, reps);
            assert!(
                e1rm > previous,
                "e1RM at {} reps ({}) not above {} reps ({})",
                reps,
                e1rm,
                reps - 1,
                previous
            );
            previous = e1rm;
        }
    }

    #[test]
    fn test_e1rm_deterministic() {
        // Pure function: identical inputs give bit-identical outputs.
        assert_eq!(
            estimate_one_rep_max(102.5, 7).to_bits(),
            estimate_one_rep_max(102.5, 7).to_bits()
        );
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(116.6667), 116.7);
        assert_eq!(round1(116.64), 116.6);
        assert_eq!(round1(100.0), 100.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.3333), 0.33);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(-0.125), -0.13);
    }
}
