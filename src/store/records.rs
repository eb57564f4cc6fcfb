//! Record types for the persisted collections.
//!
//! All records serialize with camelCase field names; the serialized form is
//! both the stored document and the portable export format, so field names
//! here are a compatibility surface and must not change casually.
//!
//! Timestamps are epoch milliseconds. Ids are caller-generated strings,
//! assigned once at creation (UUID v4 for user-created records).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Fixed primary key of the singleton profile record.
pub const PROFILE_SENTINEL_ID: &str = "singleton";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// =============================================================================
// Exercises
// =============================================================================

/// An exercise definition, either seeded reference data or user-created.
///
/// Seeded exercises (`is_custom == false`) are regenerated at first run and
/// never travel through export/import; only custom ones do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    /// Equipment class, e.g. "barbell" or "bodyweight". Opaque to the store.
    pub category: String,
    /// Primary muscle group, e.g. "chest". Opaque to the store.
    pub muscle_group: String,
    pub is_custom: bool,
    pub is_archived: bool,
    /// Number of finished sessions that included this exercise.
    pub usage_count: u32,
    pub created_at: i64,
}

impl Exercise {
    /// Create a user-defined exercise with a fresh id.
    pub fn custom(
        name: impl Into<String>,
        category: impl Into<String>,
        muscle_group: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            category: category.into(),
            muscle_group: muscle_group.into(),
            is_custom: true,
            is_archived: false,
            usage_count: 0,
            created_at: now_ms(),
        }
    }
}

// =============================================================================
// Sets
// =============================================================================

/// Kind of a planned or performed set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SetKind {
    /// A working set with reps and weight.
    Normal,
    /// A rest/interval timer inserted between working sets.
    Timer,
}

/// One set inside a routine template or a session snapshot.
///
/// Routine templates carry only the planned fields; the completion flags are
/// filled in when a session is performed and stay absent otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSpec {
    #[serde(rename = "type")]
    pub kind: SetKind,
    pub reps: u32,
    pub weight: f64,
    /// Timer duration in seconds; only present for timer sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Whether the set was completed during the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// Whether the set was a personal record.
    #[serde(rename = "isPR", default, skip_serializing_if = "Option::is_none")]
    pub is_pr: Option<bool>,
}

impl SetSpec {
    /// A planned working set.
    pub fn normal(reps: u32, weight: f64) -> Self {
        Self {
            kind: SetKind::Normal,
            reps,
            weight,
            duration: None,
            completed: None,
            is_pr: None,
        }
    }

    /// A rest timer of the given duration in seconds.
    pub fn timer(duration: u32) -> Self {
        Self {
            kind: SetKind::Timer,
            reps: 0,
            weight: 0.0,
            duration: Some(duration),
            completed: None,
            is_pr: None,
        }
    }
}

// =============================================================================
// Routines
// =============================================================================

/// One exercise slot inside a routine, owned by value.
///
/// `exercise_id` is a weak reference: the exercise may have been deleted,
/// and consumers must treat a failed lookup as a normal branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineExercise {
    pub exercise_id: String,
    pub sets: Vec<SetSpec>,
    #[serde(default)]
    pub note: String,
}

/// A reusable workout template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub exercises: Vec<RoutineExercise>,
    pub created_at: i64,
    pub updated_at: i64,
    /// When a session was last started from this routine, if ever.
    pub last_used_at: Option<i64>,
}

impl Routine {
    /// Create an empty routine with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            id: new_id(),
            name: name.into(),
            exercises: Vec::new(),
            created_at: now,
            updated_at: now,
            last_used_at: None,
        }
    }
}

// =============================================================================
// Sessions
// =============================================================================

/// Best completed set of an exercise within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestSet {
    pub weight: f64,
    pub reps: u32,
    #[serde(rename = "estimated1RM")]
    pub estimated_1rm: f64,
}

/// Exercise snapshot inside a finished session.
///
/// `exercise_name` is denormalized at completion time so the historical
/// record survives deletion of the referenced exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExercise {
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets: Vec<SetSpec>,
    #[serde(default)]
    pub note: String,
    pub best_set: Option<BestSet>,
}

/// An immutable record of a finished workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    /// Weak reference to the routine this session was started from.
    pub routine_id: Option<String>,
    pub name: String,
    pub start_time: i64,
    pub end_time: i64,
    /// Elapsed time in seconds.
    pub duration: i64,
    /// Sum of weight x reps over completed sets.
    pub total_volume: f64,
    pub pr_count: u32,
    pub exercises: Vec<SessionExercise>,
    pub created_at: i64,
}

// =============================================================================
// Measurements
// =============================================================================

/// A point-in-time body measurement sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: String,
    /// Measurement type key, e.g. "weight" or "body_fat". Opaque to the store.
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
    pub unit: String,
    /// Sample date as epoch milliseconds.
    pub date: i64,
    pub created_at: i64,
}

impl Measurement {
    /// Create a measurement sample with a fresh id.
    pub fn new(kind: impl Into<String>, value: f64, unit: impl Into<String>, date: i64) -> Self {
        Self {
            id: new_id(),
            kind: kind.into(),
            value,
            unit: unit.into(),
            date,
            created_at: now_ms(),
        }
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Where previous-set hints are looked up during a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PreviousSetsMode {
    /// Only sessions started from the same routine.
    SameRoutine,
    /// Any past session containing the exercise.
    Any,
}

/// What to do with incomplete sets when a session finishes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum IncompleteSetPolicy {
    Ask,
    Keep,
    Delete,
}

/// A barbell available for plate-math suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarSpec {
    pub name: String,
    pub weight: f64,
}

/// A plate denomination and how many the user owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateSpec {
    pub weight: f64,
    pub count: u32,
}

/// Rest-timer defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestTimerSettings {
    /// Use one shared timer instead of per-set timers.
    pub simple_timers: bool,
    pub default_seconds: u32,
}

/// User preferences nested inside the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub sound_effects: bool,
    pub lock_completed_sets: bool,
    pub confirm_delete_set: bool,
    pub previous_sets: PreviousSetsMode,
    pub manage_incomplete_sets: IncompleteSetPolicy,
    pub available_bars: Vec<BarSpec>,
    pub available_plates: Vec<PlateSpec>,
    pub rest_timer: RestTimerSettings,
}

/// One widget entry on the dashboard, ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardWidget {
    pub id: String,
    /// Widget-specific configuration, opaque to the store.
    #[serde(default)]
    pub config: Value,
}

/// The singleton user profile.
///
/// Exactly one profile record exists, keyed by [`PROFILE_SENTINEL_ID`];
/// every write forces that id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub avatar_initials: String,
    pub total_workouts: u32,
    pub theme: String,
    pub settings: Settings,
    pub dashboard_widgets: Vec<DashboardWidget>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Profile {
    /// The fully populated default profile created at first run.
    pub fn default_record(now: i64) -> Self {
        Self {
            id: PROFILE_SENTINEL_ID.to_string(),
            name: "User".to_string(),
            avatar_initials: "U".to_string(),
            total_workouts: 0,
            theme: "dark".to_string(),
            settings: Settings {
                sound_effects: true,
                lock_completed_sets: false,
                confirm_delete_set: true,
                previous_sets: PreviousSetsMode::SameRoutine,
                manage_incomplete_sets: IncompleteSetPolicy::Ask,
                available_bars: vec![
                    BarSpec {
                        name: "Olympic".to_string(),
                        weight: 20.0,
                    },
                    BarSpec {
                        name: "EZ".to_string(),
                        weight: 10.0,
                    },
                ],
                available_plates: [25.0, 20.0, 15.0, 10.0, 5.0, 2.5, 1.25]
                    .iter()
                    .map(|&weight| PlateSpec { weight, count: 4 })
                    .collect(),
                rest_timer: RestTimerSettings {
                    simple_timers: false,
                    default_seconds: 90,
                },
            },
            dashboard_widgets: vec![DashboardWidget {
                id: "weekly_workouts".to_string(),
                config: Value::Object(serde_json::Map::new()),
            }],
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_serializes_camel_case() {
        let exercise = Exercise::custom("Bench Press", "barbell", "chest");
        let value = serde_json::to_value(&exercise).unwrap();

        assert_eq!(value["muscleGroup"], "chest");
        assert_eq!(value["isCustom"], true);
        assert_eq!(value["isArchived"], false);
        assert_eq!(value["usageCount"], 0);
        assert!(value["createdAt"].is_i64());
    }

    #[test]
    fn test_custom_exercises_get_distinct_ids() {
        let a = Exercise::custom("A", "barbell", "chest");
        let b = Exercise::custom("B", "barbell", "chest");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_set_spec_omits_absent_session_flags() {
        let planned = SetSpec::normal(8, 60.0);
        let value = serde_json::to_value(&planned).unwrap();

        assert_eq!(value["type"], "normal");
        assert!(value.get("completed").is_none());
        assert!(value.get("isPR").is_none());
        assert!(value.get("duration").is_none());

        let mut performed = planned;
        performed.completed = Some(true);
        performed.is_pr = Some(true);
        let value = serde_json::to_value(&performed).unwrap();
        assert_eq!(value["completed"], true);
        assert_eq!(value["isPR"], true);
    }

    #[test]
    fn test_routine_round_trips_null_last_used() {
        let routine = Routine::new("Push Day");
        let json = serde_json::to_string(&routine).unwrap();
        assert!(json.contains("\"lastUsedAt\":null"));

        let back: Routine = serde_json::from_str(&json).unwrap();
        assert_eq!(back, routine);
    }

    #[test]
    fn test_best_set_key_spelling() {
        let best = BestSet {
            weight: 100.0,
            reps: 5,
            estimated_1rm: 116.5,
        };
        let value = serde_json::to_value(&best).unwrap();
        assert!(value.get("estimated1RM").is_some());
    }

    #[test]
    fn test_default_profile_shape() {
        let profile = Profile::default_record(1_000);
        assert_eq!(profile.id, PROFILE_SENTINEL_ID);
        assert_eq!(profile.settings.available_plates.len(), 7);
        assert_eq!(profile.settings.rest_timer.default_seconds, 90);
        assert_eq!(profile.dashboard_widgets[0].id, "weekly_workouts");
        assert_eq!(profile.created_at, profile.updated_at);

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["settings"]["previousSets"], "same_routine");
        assert_eq!(value["settings"]["manageIncompleteSets"], "ask");
        assert_eq!(value["dashboardWidgets"][0]["config"], serde_json::json!({}));
    }
}
