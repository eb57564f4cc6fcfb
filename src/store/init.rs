//! First-run bootstrap: seed exercises and default profile.
//!
//! Runs at application startup, after the database opens and before any
//! reads. Both steps are guarded by a pre-check, so calling this on every
//! launch is a no-op once the store is populated.

use chrono::Utc;

use crate::store::facade::Store;
use crate::store::records::Profile;
use crate::store::schema::EXERCISES;
use crate::store::seed::REFERENCE_EXERCISES;
use crate::store::StorageError;

/// What the bootstrap actually did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InitReport {
    /// Number of reference exercises inserted (0 when already seeded).
    pub seeded_exercises: usize,
    /// Whether the default profile was created.
    pub created_profile: bool,
}

/// Seed the exercises collection and create the default profile if absent.
pub(crate) async fn initialize(store: &Store) -> Result<InitReport, StorageError> {
    let mut report = InitReport::default();

    if store.collections().count(EXERCISES).await? == 0 {
        let now = Utc::now().timestamp_millis();
        for seed in REFERENCE_EXERCISES {
            store.put_exercise(&seed.into_exercise(now)).await?;
        }
        report.seeded_exercises = REFERENCE_EXERCISES.len();
        tracing::info!(count = report.seeded_exercises, "seeded reference exercises");
    }

    if store.get_profile().await?.is_none() {
        let now = Utc::now().timestamp_millis();
        store.save_profile(&Profile::default_record(now)).await?;
        report.created_profile = true;
        tracing::info!("created default profile");
    }

    Ok(report)
}
