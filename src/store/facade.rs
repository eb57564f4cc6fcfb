//! Store facade and builder.
//!
//! [`Store`] is the handle UI collaborators talk to: the generic collection
//! operations plus typed per-entity wrappers. [`StoreBuilder`] is the
//! configuration surface (database location, pool size).

use std::path::Path;
use std::sync::Arc;

use crate::store::collections::{CollectionStore, IndexKey, IndexValue};
use crate::store::db::{Database, Location};
use crate::store::init::{self, InitReport};
use crate::store::records::{
    Exercise, Measurement, Profile, Routine, Session, PROFILE_SENTINEL_ID,
};
use crate::store::schema::{EXERCISES, MEASUREMENTS, PROFILE, ROUTINES, SESSIONS};
use crate::store::StorageError;

/// Builder for constructing a [`Store`].
pub struct StoreBuilder {
    location: Location,
    max_connections: Option<u32>,
}

impl StoreBuilder {
    /// Store backed by a database file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            location: Location::File(path.as_ref().to_path_buf()),
            max_connections: None,
        }
    }

    /// Ephemeral in-memory store.
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            max_connections: None,
        }
    }

    /// Set the connection pool size for file-backed stores.
    pub fn max_connections(mut self, size: u32) -> Self {
        self.max_connections = Some(size);
        self
    }

    /// Open the database and return the store handle.
    ///
    /// Connects eagerly so an unavailable database surfaces here, at
    /// startup, rather than on the first read.
    pub async fn build(self) -> Result<Store, StorageError> {
        let mut database = Database::with_location(self.location);
        if let Some(size) = self.max_connections {
            database = database.max_connections(size);
        }

        let db = Arc::new(database);
        db.open().await?;

        Ok(Store {
            collections: CollectionStore::new(Arc::clone(&db)),
            db,
        })
    }
}

/// Handle to the persistent store.
///
/// Cheap to clone; all clones share the same connection manager.
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
    collections: CollectionStore,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    /// The generic collection operations.
    pub fn collections(&self) -> &CollectionStore {
        &self.collections
    }

    /// Run the first-run bootstrap (reference exercises, default profile).
    /// Idempotent; call once per startup.
    pub async fn initialize(&self) -> Result<InitReport, StorageError> {
        init::initialize(self).await
    }

    /// Close the underlying connection. The next operation reconnects.
    pub async fn close(&self) {
        self.db.close().await;
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Fetch the singleton profile, if one has been created.
    pub async fn get_profile(&self) -> Result<Option<Profile>, StorageError> {
        self.collections.get(PROFILE, PROFILE_SENTINEL_ID).await
    }

    /// Save the profile, forcing the singleton key regardless of the id on
    /// the given record.
    pub async fn save_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        let mut record = profile.clone();
        record.id = PROFILE_SENTINEL_ID.to_string();
        self.collections.put(PROFILE, &record).await?;
        Ok(())
    }

    // =========================================================================
    // Exercises
    // =========================================================================

    /// All exercises, seeded and custom.
    pub async fn all_exercises(&self) -> Result<Vec<Exercise>, StorageError> {
        self.collections.get_all(EXERCISES).await
    }

    /// Exercises not archived, i.e. the set pickers offer.
    pub async fn active_exercises(&self) -> Result<Vec<Exercise>, StorageError> {
        self.collections
            .get_by_index(EXERCISES, "is_archived", IndexKey::single(false))
            .await
    }

    /// Exercises for one muscle group.
    pub async fn exercises_by_muscle_group(
        &self,
        muscle_group: &str,
    ) -> Result<Vec<Exercise>, StorageError> {
        self.collections
            .get_by_index(EXERCISES, "muscle_group", IndexKey::single(muscle_group))
            .await
    }

    /// Exercises for one equipment category.
    pub async fn exercises_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Exercise>, StorageError> {
        self.collections
            .get_by_index(EXERCISES, "category", IndexKey::single(category))
            .await
    }

    /// Only the user-created exercises.
    pub async fn custom_exercises(&self) -> Result<Vec<Exercise>, StorageError> {
        let all = self.all_exercises().await?;
        Ok(all.into_iter().filter(|ex| ex.is_custom).collect())
    }

    /// Upsert an exercise.
    pub async fn put_exercise(&self, exercise: &Exercise) -> Result<(), StorageError> {
        self.collections.put(EXERCISES, exercise).await?;
        Ok(())
    }

    /// Hard-delete an exercise. Only meaningful for custom exercises; the
    /// caller is expected to have checked `is_custom`.
    pub async fn delete_exercise(&self, id: &str) -> Result<(), StorageError> {
        self.collections.delete(EXERCISES, id).await
    }

    /// Delete every custom exercise, leaving seeded ones in place.
    pub async fn clear_custom_exercises(&self) -> Result<(), StorageError> {
        for exercise in self.custom_exercises().await? {
            self.collections.delete(EXERCISES, &exercise.id).await?;
        }
        Ok(())
    }

    /// Bump the usage counter after a finished session included the
    /// exercise. A dangling id is a normal branch and returns `false`.
    pub async fn increment_exercise_usage(&self, id: &str) -> Result<bool, StorageError> {
        let Some(mut exercise) = self.collections.get::<Exercise>(EXERCISES, id).await? else {
            return Ok(false);
        };
        exercise.usage_count += 1;
        self.put_exercise(&exercise).await?;
        Ok(true)
    }

    /// Archive an exercise so pickers stop offering it. Returns `false` for
    /// a missing id.
    pub async fn archive_exercise(&self, id: &str) -> Result<bool, StorageError> {
        self.set_exercise_archived(id, true).await
    }

    /// Bring an archived exercise back.
    pub async fn restore_exercise(&self, id: &str) -> Result<bool, StorageError> {
        self.set_exercise_archived(id, false).await
    }

    async fn set_exercise_archived(
        &self,
        id: &str,
        archived: bool,
    ) -> Result<bool, StorageError> {
        let Some(mut exercise) = self.collections.get::<Exercise>(EXERCISES, id).await? else {
            return Ok(false);
        };
        exercise.is_archived = archived;
        self.put_exercise(&exercise).await?;
        Ok(true)
    }

    // =========================================================================
    // Routines
    // =========================================================================

    /// All routine templates.
    pub async fn all_routines(&self) -> Result<Vec<Routine>, StorageError> {
        self.collections.get_all(ROUTINES).await
    }

    /// Upsert a routine.
    pub async fn put_routine(&self, routine: &Routine) -> Result<(), StorageError> {
        self.collections.put(ROUTINES, routine).await?;
        Ok(())
    }

    /// Delete a routine. Sessions referencing it keep their dangling id.
    pub async fn delete_routine(&self, id: &str) -> Result<(), StorageError> {
        self.collections.delete(ROUTINES, id).await
    }

    /// Remove all routines.
    pub async fn clear_routines(&self) -> Result<(), StorageError> {
        self.collections.clear(ROUTINES).await
    }

    /// Stamp a routine as used at `at` (epoch ms) after a session started
    /// from it finishes. Returns `false` for a missing id.
    pub async fn touch_routine(&self, id: &str, at: i64) -> Result<bool, StorageError> {
        let Some(mut routine) = self.collections.get::<Routine>(ROUTINES, id).await? else {
            return Ok(false);
        };
        routine.last_used_at = Some(at);
        routine.updated_at = at;
        self.put_routine(&routine).await?;
        Ok(true)
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// All finished sessions.
    pub async fn all_sessions(&self) -> Result<Vec<Session>, StorageError> {
        self.collections.get_all(SESSIONS).await
    }

    /// Upsert a session record.
    pub async fn put_session(&self, session: &Session) -> Result<(), StorageError> {
        self.collections.put(SESSIONS, session).await?;
        Ok(())
    }

    /// Delete a session.
    pub async fn delete_session(&self, id: &str) -> Result<(), StorageError> {
        self.collections.delete(SESSIONS, id).await
    }

    /// Remove all sessions.
    pub async fn clear_sessions(&self) -> Result<(), StorageError> {
        self.collections.clear(SESSIONS).await
    }

    /// Sessions started from the given routine.
    pub async fn sessions_by_routine(
        &self,
        routine_id: &str,
    ) -> Result<Vec<Session>, StorageError> {
        self.collections
            .get_by_index(SESSIONS, "routine_id", IndexKey::single(routine_id))
            .await
    }

    /// Sessions whose start time lies in `[from, to]`, ordered by start time.
    pub async fn sessions_in_range(
        &self,
        from: i64,
        to: i64,
    ) -> Result<Vec<Session>, StorageError> {
        self.collections
            .get_by_index_range(
                SESSIONS,
                "start_time",
                IndexKey::single(from),
                IndexKey::single(to),
            )
            .await
    }

    // =========================================================================
    // Measurements
    // =========================================================================

    /// All measurement samples.
    pub async fn all_measurements(&self) -> Result<Vec<Measurement>, StorageError> {
        self.collections.get_all(MEASUREMENTS).await
    }

    /// Upsert a measurement sample.
    pub async fn put_measurement(&self, measurement: &Measurement) -> Result<(), StorageError> {
        self.collections.put(MEASUREMENTS, measurement).await?;
        Ok(())
    }

    /// Delete a measurement sample.
    pub async fn delete_measurement(&self, id: &str) -> Result<(), StorageError> {
        self.collections.delete(MEASUREMENTS, id).await
    }

    /// Remove all measurements.
    pub async fn clear_measurements(&self) -> Result<(), StorageError> {
        self.collections.clear(MEASUREMENTS).await
    }

    /// All samples of one measurement type.
    pub async fn measurements_by_type(
        &self,
        kind: &str,
    ) -> Result<Vec<Measurement>, StorageError> {
        self.collections
            .get_by_index(MEASUREMENTS, "type", IndexKey::single(kind))
            .await
    }

    /// Samples of one type with date in `[from, to]`, ordered by date.
    pub async fn measurements_in_range(
        &self,
        kind: &str,
        from: i64,
        to: i64,
    ) -> Result<Vec<Measurement>, StorageError> {
        self.collections
            .get_by_index_range(
                MEASUREMENTS,
                "type_date",
                IndexKey::compound([IndexValue::from(kind), IndexValue::from(from)]),
                IndexKey::compound([IndexValue::from(kind), IndexValue::from(to)]),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn build_store(dir: &tempfile::TempDir) -> Store {
        StoreBuilder::new(dir.path().join("store.db"))
            .build()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_profile_singleton_key_forced() {
        let dir = tempdir().unwrap();
        let store = build_store(&dir).await;

        let mut profile = Profile::default_record(1_000);
        profile.id = "whatever-the-caller-put-here".to_string();
        profile.name = "Lena".to_string();
        store.save_profile(&profile).await.unwrap();

        let fetched = store.get_profile().await.unwrap().unwrap();
        assert_eq!(fetched.id, PROFILE_SENTINEL_ID);
        assert_eq!(fetched.name, "Lena");

        // A second save with yet another id still lands on the same record
        profile.id = "another-id".to_string();
        profile.name = "Lena K.".to_string();
        store.save_profile(&profile).await.unwrap();

        assert_eq!(
            store.collections().count(PROFILE).await.unwrap(),
            1,
            "profile writes must never create a second record"
        );
        assert_eq!(store.get_profile().await.unwrap().unwrap().name, "Lena K.");
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = build_store(&dir).await;

        let first = store.initialize().await.unwrap();
        assert!(first.seeded_exercises > 0);
        assert!(first.created_profile);

        let count_after_first = store.collections().count(EXERCISES).await.unwrap();

        for _ in 0..3 {
            let again = store.initialize().await.unwrap();
            assert_eq!(again.seeded_exercises, 0);
            assert!(!again.created_profile);
        }

        assert_eq!(
            store.collections().count(EXERCISES).await.unwrap(),
            count_after_first
        );
        assert_eq!(store.collections().count(PROFILE).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_seeding_skipped_when_populated() {
        let dir = tempdir().unwrap();
        let store = build_store(&dir).await;

        // A single pre-existing exercise means the seed step must not run
        store
            .put_exercise(&Exercise::custom("My Move", "dumbbell", "chest"))
            .await
            .unwrap();

        let report = store.initialize().await.unwrap();
        assert_eq!(report.seeded_exercises, 0);
        assert_eq!(store.collections().count(EXERCISES).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_custom_exercise_lifecycle() {
        let dir = tempdir().unwrap();
        let store = build_store(&dir).await;
        store.initialize().await.unwrap();

        let custom = Exercise::custom("Zercher Squat", "barbell", "legs");
        store.put_exercise(&custom).await.unwrap();

        let customs = store.custom_exercises().await.unwrap();
        assert_eq!(customs.len(), 1);
        assert_eq!(customs[0].name, "Zercher Squat");

        // Archive hides it from the active set
        assert!(store.archive_exercise(&custom.id).await.unwrap());
        let active = store.active_exercises().await.unwrap();
        assert!(active.iter().all(|ex| ex.id != custom.id));

        assert!(store.restore_exercise(&custom.id).await.unwrap());
        let active = store.active_exercises().await.unwrap();
        assert!(active.iter().any(|ex| ex.id == custom.id));

        // Usage bump
        assert!(store.increment_exercise_usage(&custom.id).await.unwrap());
        let reloaded: Exercise = store
            .collections()
            .get(EXERCISES, &custom.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.usage_count, 1);

        // Dangling ids are a normal branch, not an error
        assert!(!store.increment_exercise_usage("gone").await.unwrap());
        assert!(!store.archive_exercise("gone").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_custom_keeps_seeded() {
        let dir = tempdir().unwrap();
        let store = build_store(&dir).await;
        let report = store.initialize().await.unwrap();

        store
            .put_exercise(&Exercise::custom("A", "barbell", "chest"))
            .await
            .unwrap();
        store
            .put_exercise(&Exercise::custom("B", "cable", "back"))
            .await
            .unwrap();

        store.clear_custom_exercises().await.unwrap();

        let remaining = store.all_exercises().await.unwrap();
        assert_eq!(remaining.len(), report.seeded_exercises);
        assert!(remaining.iter().all(|ex| !ex.is_custom));
    }

    #[tokio::test]
    async fn test_touch_routine() {
        let dir = tempdir().unwrap();
        let store = build_store(&dir).await;

        let routine = Routine::new("Pull Day");
        store.put_routine(&routine).await.unwrap();
        assert!(store.touch_routine(&routine.id, 5_000).await.unwrap());

        let reloaded: Routine = store
            .collections()
            .get(ROUTINES, &routine.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.last_used_at, Some(5_000));
        assert_eq!(reloaded.updated_at, 5_000);

        assert!(!store.touch_routine("gone", 5_000).await.unwrap());
    }

    #[tokio::test]
    async fn test_measurement_queries() {
        let dir = tempdir().unwrap();
        let store = build_store(&dir).await;

        for (kind, date) in [("weight", 1), ("weight", 5), ("weight", 20), ("body_fat", 5)] {
            store
                .put_measurement(&Measurement::new(kind, 80.0, "kg", date))
                .await
                .unwrap();
        }

        let weights = store.measurements_by_type("weight").await.unwrap();
        assert_eq!(weights.len(), 3);

        let windowed = store.measurements_in_range("weight", 1, 10).await.unwrap();
        let dates: Vec<i64> = windowed.iter().map(|m| m.date).collect();
        assert_eq!(dates, [1, 5]);
    }

    #[tokio::test]
    async fn test_session_queries() {
        let dir = tempdir().unwrap();
        let store = build_store(&dir).await;

        let routine = Routine::new("Legs");
        store.put_routine(&routine).await.unwrap();

        for (id, start, from_routine) in
            [("s-1", 100, true), ("s-2", 200, false), ("s-3", 300, true)]
        {
            let session = Session {
                id: id.to_string(),
                routine_id: from_routine.then(|| routine.id.clone()),
                name: "Legs".to_string(),
                start_time: start,
                end_time: start + 3_600_000,
                duration: 3_600,
                total_volume: 1000.0,
                pr_count: 0,
                exercises: Vec::new(),
                created_at: start,
            };
            store.put_session(&session).await.unwrap();
        }

        let from_routine = store.sessions_by_routine(&routine.id).await.unwrap();
        assert_eq!(from_routine.len(), 2);

        let windowed = store.sessions_in_range(150, 350).await.unwrap();
        let ids: Vec<&str> = windowed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["s-2", "s-3"]);
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = StoreBuilder::in_memory().build().await.unwrap();
        store.initialize().await.unwrap();
        assert!(store.get_profile().await.unwrap().is_some());
    }
}
