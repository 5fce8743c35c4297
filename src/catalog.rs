//! Built-in exercise catalog with elite strength benchmarks.
//!
//! Each exercise carries exactly one benchmark kind: barbell lifts are
//! benchmarked as a multiple of bodyweight, bodyweight exercises as a
//! repetition count. The values are calibrated against published
//! strength standards for advanced/elite male lifters; the female
//! adjustment is applied at scoring time, not here.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::domain::MuscleGroup;

/// Elite reference performance for an exercise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Benchmark {
    /// Elite one-rep max as a multiple of bodyweight.
    BodyweightRatio(f64),
    /// Elite repetition count for a single set.
    Reps(u32),
}

/// A supported exercise.
#[derive(Debug)]
pub struct Exercise {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub muscle_group: MuscleGroup,
    pub benchmark: Benchmark,
}

impl Exercise {
    /// Returns the URL-safe identifier ("back squat" -> "back-squat").
    pub fn id(&self) -> String {
        self.name.replace(' ', "-")
    }
}

pub static EXERCISES: &[Exercise] = &[
    Exercise {
        name: "back squat",
        aliases: &["squat"],
        muscle_group: MuscleGroup::Legs,
        benchmark: Benchmark::BodyweightRatio(2.5),
    },
    Exercise {
        name: "front squat",
        aliases: &[],
        muscle_group: MuscleGroup::Legs,
        benchmark: Benchmark::BodyweightRatio(2.0),
    },
    Exercise {
        name: "romanian deadlift",
        aliases: &["rdl"],
        muscle_group: MuscleGroup::Legs,
        benchmark: Benchmark::BodyweightRatio(2.2),
    },
    Exercise {
        name: "bench press",
        aliases: &["bench"],
        muscle_group: MuscleGroup::Chest,
        benchmark: Benchmark::BodyweightRatio(1.75),
    },
    Exercise {
        name: "incline bench press",
        aliases: &["incline bench"],
        muscle_group: MuscleGroup::Chest,
        benchmark: Benchmark::BodyweightRatio(1.4),
    },
    Exercise {
        name: "deadlift",
        aliases: &[],
        muscle_group: MuscleGroup::Back,
        benchmark: Benchmark::BodyweightRatio(3.0),
    },
    Exercise {
        name: "barbell row",
        aliases: &["row"],
        muscle_group: MuscleGroup::Back,
        benchmark: Benchmark::BodyweightRatio(1.75),
    },
    Exercise {
        name: "overhead press",
        aliases: &["ohp", "press"],
        muscle_group: MuscleGroup::Shoulders,
        benchmark: Benchmark::BodyweightRatio(1.2),
    },
    Exercise {
        name: "barbell curl",
        aliases: &["curl"],
        muscle_group: MuscleGroup::Biceps,
        benchmark: Benchmark::BodyweightRatio(0.85),
    },
    Exercise {
        name: "pull-up",
        aliases: &["pullup", "pull up"],
        muscle_group: MuscleGroup::Back,
        benchmark: Benchmark::Reps(25),
    },
    Exercise {
        name: "chin-up",
        aliases: &["chinup", "chin up"],
        muscle_group: MuscleGroup::Biceps,
        benchmark: Benchmark::Reps(25),
    },
    Exercise {
        name: "push-up",
        aliases: &["pushup", "push up"],
        muscle_group: MuscleGroup::Chest,
        benchmark: Benchmark::Reps(60),
    },
    Exercise {
        name: "dip",
        aliases: &["dips"],
        muscle_group: MuscleGroup::Triceps,
        benchmark: Benchmark::Reps(30),
    },
    Exercise {
        name: "hanging leg raise",
        aliases: &["leg raise"],
        muscle_group: MuscleGroup::Core,
        benchmark: Benchmark::Reps(20),
    },
    Exercise {
        name: "sit-up",
        aliases: &["situp", "sit up"],
        muscle_group: MuscleGroup::Core,
        benchmark: Benchmark::Reps(50),
    },
];

static BY_NAME: LazyLock<HashMap<&'static str, &'static Exercise>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for exercise in EXERCISES {
        map.insert(exercise.name, exercise);
        for alias in exercise.aliases {
            map.insert(*alias, exercise);
        }
    }
    map
});

/// Returns all catalog exercises in display order.
pub fn all() -> &'static [Exercise] {
    EXERCISES
}

/// Looks up an exercise by canonical name or alias, case-insensitive.
/// Hyphens and spaces are interchangeable, so URL ids resolve too.
pub fn find(name: &str) -> Option<&'static Exercise> {
    let normalized = name.trim().to_lowercase().replace('-', " ");
    BY_NAME
        .get(normalized.as_str())
        .or_else(|| BY_NAME.get(name.trim().to_lowercase().as_str()))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_canonical_name() {
        let exercise = find("back squat").unwrap();
        assert_eq!(exercise.name, "back squat");
        assert_eq!(exercise.muscle_group, MuscleGroup::Legs);
    }

    #[test]
    fn test_find_by_alias() {
        assert_eq!(find("squat").unwrap().name, "back squat");
        assert_eq!(find("ohp").unwrap().name, "overhead press");
        assert_eq!(find("pullup").unwrap().name, "pull-up");
    }

    #[test]
    fn test_find_case_insensitive_and_trimmed() {
        assert_eq!(find("  Bench Press ").unwrap().name, "bench press");
        assert_eq!(find("DEADLIFT").unwrap().name, "deadlift");
    }

    #[test]
    fn test_find_by_url_id() {
        assert_eq!(find("back-squat").unwrap().name, "back squat");
        assert_eq!(find("pull-up").unwrap().name, "pull-up");
    }

    #[test]
    fn test_find_unknown() {
        assert!(find("zercher squat").is_none());
        assert!(find("").is_none());
    }

    #[test]
    fn test_id_round_trips_through_find() {
        for exercise in all() {
            let id = exercise.id();
            assert_eq!(find(&id).unwrap().name, exercise.name, "id {}", id);
        }
    }

    #[test]
    fn test_barbell_lifts_use_ratio_benchmarks() {
        assert!(matches!(
            find("back squat").unwrap().benchmark,
            Benchmark::BodyweightRatio(r) if r > 0.0
        ));
        assert!(matches!(
            find("pull-up").unwrap().benchmark,
            Benchmark::Reps(r) if r > 0
        ));
    }
}
