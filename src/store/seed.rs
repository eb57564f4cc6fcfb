//! Static reference-exercise catalog.
//!
//! Loaded into the exercises collection at first run only. Ids are
//! deterministic so weak references from routines and sessions still resolve
//! when an exported snapshot is imported into a fresh install.

use crate::store::records::Exercise;

/// One catalog entry. Expanded into a full [`Exercise`] record at seed time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SeedExercise {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub muscle_group: &'static str,
}

impl SeedExercise {
    pub(crate) fn into_exercise(self, created_at: i64) -> Exercise {
        Exercise {
            id: self.id.to_string(),
            name: self.name.to_string(),
            category: self.category.to_string(),
            muscle_group: self.muscle_group.to_string(),
            is_custom: false,
            is_archived: false,
            usage_count: 0,
            created_at,
        }
    }
}

/// The reference catalog, sorted by muscle group then name.
pub(crate) const REFERENCE_EXERCISES: &[SeedExercise] = &[
    // Chest
    SeedExercise {
        id: "seed-barbell-bench-press",
        name: "Barbell Bench Press",
        category: "barbell",
        muscle_group: "chest",
    },
    SeedExercise {
        id: "seed-incline-bench-press",
        name: "Incline Bench Press",
        category: "barbell",
        muscle_group: "chest",
    },
    SeedExercise {
        id: "seed-dumbbell-bench-press",
        name: "Dumbbell Bench Press",
        category: "dumbbell",
        muscle_group: "chest",
    },
    SeedExercise {
        id: "seed-dumbbell-fly",
        name: "Dumbbell Fly",
        category: "dumbbell",
        muscle_group: "chest",
    },
    SeedExercise {
        id: "seed-cable-crossover",
        name: "Cable Crossover",
        category: "cable",
        muscle_group: "chest",
    },
    SeedExercise {
        id: "seed-push-up",
        name: "Push-Up",
        category: "bodyweight",
        muscle_group: "chest",
    },
    SeedExercise {
        id: "seed-chest-dip",
        name: "Chest Dip",
        category: "bodyweight",
        muscle_group: "chest",
    },
    // Back
    SeedExercise {
        id: "seed-deadlift",
        name: "Deadlift",
        category: "barbell",
        muscle_group: "back",
    },
    SeedExercise {
        id: "seed-barbell-row",
        name: "Barbell Row",
        category: "barbell",
        muscle_group: "back",
    },
    SeedExercise {
        id: "seed-dumbbell-row",
        name: "Dumbbell Row",
        category: "dumbbell",
        muscle_group: "back",
    },
    SeedExercise {
        id: "seed-lat-pulldown",
        name: "Lat Pulldown",
        category: "machine",
        muscle_group: "back",
    },
    SeedExercise {
        id: "seed-seated-cable-row",
        name: "Seated Cable Row",
        category: "cable",
        muscle_group: "back",
    },
    SeedExercise {
        id: "seed-pull-up",
        name: "Pull-Up",
        category: "bodyweight",
        muscle_group: "back",
    },
    SeedExercise {
        id: "seed-chin-up",
        name: "Chin-Up",
        category: "bodyweight",
        muscle_group: "back",
    },
    // Shoulders
    SeedExercise {
        id: "seed-overhead-press",
        name: "Overhead Press",
        category: "barbell",
        muscle_group: "shoulders",
    },
    SeedExercise {
        id: "seed-dumbbell-shoulder-press",
        name: "Dumbbell Shoulder Press",
        category: "dumbbell",
        muscle_group: "shoulders",
    },
    SeedExercise {
        id: "seed-lateral-raise",
        name: "Lateral Raise",
        category: "dumbbell",
        muscle_group: "shoulders",
    },
    SeedExercise {
        id: "seed-front-raise",
        name: "Front Raise",
        category: "dumbbell",
        muscle_group: "shoulders",
    },
    SeedExercise {
        id: "seed-face-pull",
        name: "Face Pull",
        category: "cable",
        muscle_group: "shoulders",
    },
    SeedExercise {
        id: "seed-upright-row",
        name: "Upright Row",
        category: "barbell",
        muscle_group: "shoulders",
    },
    // Biceps
    SeedExercise {
        id: "seed-barbell-curl",
        name: "Barbell Curl",
        category: "barbell",
        muscle_group: "biceps",
    },
    SeedExercise {
        id: "seed-dumbbell-curl",
        name: "Dumbbell Curl",
        category: "dumbbell",
        muscle_group: "biceps",
    },
    SeedExercise {
        id: "seed-hammer-curl",
        name: "Hammer Curl",
        category: "dumbbell",
        muscle_group: "biceps",
    },
    SeedExercise {
        id: "seed-preacher-curl",
        name: "Preacher Curl",
        category: "machine",
        muscle_group: "biceps",
    },
    // Triceps
    SeedExercise {
        id: "seed-close-grip-bench-press",
        name: "Close-Grip Bench Press",
        category: "barbell",
        muscle_group: "triceps",
    },
    SeedExercise {
        id: "seed-triceps-pushdown",
        name: "Triceps Pushdown",
        category: "cable",
        muscle_group: "triceps",
    },
    SeedExercise {
        id: "seed-overhead-triceps-extension",
        name: "Overhead Triceps Extension",
        category: "dumbbell",
        muscle_group: "triceps",
    },
    SeedExercise {
        id: "seed-skull-crusher",
        name: "Skull Crusher",
        category: "barbell",
        muscle_group: "triceps",
    },
    // Legs
    SeedExercise {
        id: "seed-back-squat",
        name: "Back Squat",
        category: "barbell",
        muscle_group: "legs",
    },
    SeedExercise {
        id: "seed-front-squat",
        name: "Front Squat",
        category: "barbell",
        muscle_group: "legs",
    },
    SeedExercise {
        id: "seed-romanian-deadlift",
        name: "Romanian Deadlift",
        category: "barbell",
        muscle_group: "legs",
    },
    SeedExercise {
        id: "seed-leg-press",
        name: "Leg Press",
        category: "machine",
        muscle_group: "legs",
    },
    SeedExercise {
        id: "seed-leg-extension",
        name: "Leg Extension",
        category: "machine",
        muscle_group: "legs",
    },
    SeedExercise {
        id: "seed-leg-curl",
        name: "Leg Curl",
        category: "machine",
        muscle_group: "legs",
    },
    SeedExercise {
        id: "seed-walking-lunge",
        name: "Walking Lunge",
        category: "dumbbell",
        muscle_group: "legs",
    },
    SeedExercise {
        id: "seed-bulgarian-split-squat",
        name: "Bulgarian Split Squat",
        category: "dumbbell",
        muscle_group: "legs",
    },
    // Glutes
    SeedExercise {
        id: "seed-hip-thrust",
        name: "Hip Thrust",
        category: "barbell",
        muscle_group: "glutes",
    },
    SeedExercise {
        id: "seed-glute-kickback",
        name: "Glute Kickback",
        category: "cable",
        muscle_group: "glutes",
    },
    // Calves
    SeedExercise {
        id: "seed-standing-calf-raise",
        name: "Standing Calf Raise",
        category: "machine",
        muscle_group: "calves",
    },
    SeedExercise {
        id: "seed-seated-calf-raise",
        name: "Seated Calf Raise",
        category: "machine",
        muscle_group: "calves",
    },
    // Core
    SeedExercise {
        id: "seed-plank",
        name: "Plank",
        category: "bodyweight",
        muscle_group: "core",
    },
    SeedExercise {
        id: "seed-crunch",
        name: "Crunch",
        category: "bodyweight",
        muscle_group: "core",
    },
    SeedExercise {
        id: "seed-hanging-leg-raise",
        name: "Hanging Leg Raise",
        category: "bodyweight",
        muscle_group: "core",
    },
    SeedExercise {
        id: "seed-cable-woodchopper",
        name: "Cable Woodchopper",
        category: "cable",
        muscle_group: "core",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_and_names_unique() {
        let ids: HashSet<_> = REFERENCE_EXERCISES.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), REFERENCE_EXERCISES.len());

        let names: HashSet<_> = REFERENCE_EXERCISES.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), REFERENCE_EXERCISES.len());
    }

    #[test]
    fn test_seed_entries_are_reference_data() {
        for seed in REFERENCE_EXERCISES {
            assert!(seed.id.starts_with("seed-"), "{} not deterministic", seed.id);
            let exercise = seed.into_exercise(42);
            assert!(!exercise.is_custom);
            assert!(!exercise.is_archived);
            assert_eq!(exercise.usage_count, 0);
            assert_eq!(exercise.created_at, 42);
        }
    }
}
