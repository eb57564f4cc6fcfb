//! Export and import over the store.
//!
//! The engine talks to the typed [`Store`] facade only; it never holds a
//! database handle of its own. Export gathers the user-created contents into
//! an [`ExportDocument`]; import validates an untrusted document and then
//! destructively replaces the store contents, one collection at a time.
//!
//! Import results are always returned as an [`ImportReport`] — errors do not
//! cross the engine boundary as `Err`, so callers can render them directly.

use chrono::Utc;
use serde_json::Value;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

use crate::store::{Exercise, Measurement, Routine, Session, StorageError, Store};
use crate::transfer::document::{
    validate_document, ExportDocument, ValidationFailure, EXPORT_VERSION,
};

/// Collection being written when an import apply step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ImportStage {
    Profile,
    Exercises,
    Routines,
    Sessions,
    Measurements,
}

/// Why an import did not complete.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The candidate document failed to parse. Nothing was mutated.
    #[error("document is not valid JSON: {0}")]
    CorruptDocument(#[source] serde_json::Error),

    /// The candidate document is structurally invalid or version
    /// incompatible. Nothing was mutated.
    #[error("invalid document: {0}")]
    Validation(ValidationFailure),

    /// A write failed after earlier stages already committed. There is no
    /// cross-collection rollback; the store may be partially overwritten.
    #[error("import failed while writing {stage}: {cause}")]
    PartialFailure {
        stage: ImportStage,
        #[source]
        cause: StorageError,
    },
}

/// How an import attempt ended.
#[derive(Debug)]
pub enum ImportOutcome {
    /// The store was replaced from the document.
    Applied,
    /// No candidate document was provided.
    NoDocument,
    /// The caller's confirmation step declined the destructive apply.
    Cancelled,
    /// The document was rejected, or the apply phase failed.
    Failed(ImportError),
}

/// Structured result handed back to the caller.
#[derive(Debug)]
pub struct ImportReport {
    pub outcome: ImportOutcome,
    /// Human-readable summary suitable for direct display.
    pub message: String,
}

impl ImportReport {
    fn new(outcome: ImportOutcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
        }
    }

    fn failed(error: ImportError) -> Self {
        let message = match &error {
            ImportError::CorruptDocument(_) => {
                "The file is invalid or corrupted (not valid JSON).".to_string()
            }
            ImportError::Validation(failure) => format!("Invalid file: {failure}."),
            ImportError::PartialFailure { stage, cause } => format!(
                "Import failed while writing {stage}; your data may be inconsistent: {cause}."
            ),
        };
        Self::new(ImportOutcome::Failed(error), message)
    }

    /// Whether the store now reflects the imported document.
    pub fn success(&self) -> bool {
        matches!(self.outcome, ImportOutcome::Applied)
    }
}

/// What an import would apply, shown to the user before confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// When the document was exported, epoch milliseconds.
    pub exported_at: i64,
    pub has_profile: bool,
    pub exercises: usize,
    pub routines: usize,
    pub sessions: usize,
    pub measurements: usize,
}

impl ImportSummary {
    fn of(document: &ExportDocument) -> Self {
        Self {
            exported_at: document.exported_at,
            has_profile: document.profile.is_some(),
            exercises: document.exercises.len(),
            routines: document.routines.len(),
            sessions: document.sessions.len(),
            measurements: document.measurements.len(),
        }
    }
}

/// Export/import engine over a [`Store`].
#[derive(Clone)]
pub struct TransferEngine {
    store: Store,
}

impl std::fmt::Debug for TransferEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferEngine").finish_non_exhaustive()
    }
}

impl TransferEngine {
    /// Create an engine over the given store handle.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Gather the full store into a portable document.
    ///
    /// Only custom exercises are included; seeded ones are regenerated at
    /// first run and never persisted in the document.
    pub async fn export_document(&self) -> Result<ExportDocument, StorageError> {
        let profile = self.store.get_profile().await?;
        let exercises = self.store.custom_exercises().await?;
        let routines = self.store.all_routines().await?;
        let sessions = self.store.all_sessions().await?;
        let measurements = self.store.all_measurements().await?;

        Ok(ExportDocument {
            version: EXPORT_VERSION,
            exported_at: Utc::now().timestamp_millis(),
            profile,
            exercises,
            routines,
            sessions,
            measurements,
        })
    }

    /// Serialize the export document for the caller's save collaborator.
    pub async fn export_json(&self) -> Result<String, StorageError> {
        let document = self.export_document().await?;
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Import a candidate document, destructively replacing store contents.
    ///
    /// `input` is the text handed over by the caller's file-selection
    /// collaborator; `None` means nothing was selected and is a non-error
    /// early return. `confirm` is invoked once with a summary of the parsed
    /// document; returning `false` aborts before any mutation.
    pub async fn import_json<F>(&self, input: Option<&str>, confirm: F) -> ImportReport
    where
        F: FnOnce(&ImportSummary) -> bool,
    {
        let Some(text) = input else {
            return ImportReport::new(ImportOutcome::NoDocument, "No file selected.");
        };

        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(error) => return ImportReport::failed(ImportError::CorruptDocument(error)),
        };

        if let Err(failure) = validate_document(&value) {
            return ImportReport::failed(ImportError::Validation(failure));
        }

        let document: ExportDocument = match serde_json::from_value(value) {
            Ok(document) => document,
            Err(error) => {
                return ImportReport::failed(ImportError::Validation(ValidationFailure {
                    field: "document",
                    reason: error.to_string(),
                }))
            }
        };

        let summary = ImportSummary::of(&document);
        if !confirm(&summary) {
            return ImportReport::new(ImportOutcome::Cancelled, "Import cancelled.");
        }

        match self.apply(&document).await {
            Ok(()) => ImportReport::new(ImportOutcome::Applied, "Data imported successfully."),
            Err(error) => ImportReport::failed(error),
        }
    }

    async fn apply(&self, document: &ExportDocument) -> Result<(), ImportError> {
        let stage = |stage: ImportStage| move |cause| ImportError::PartialFailure { stage, cause };

        if let Some(profile) = &document.profile {
            self.store
                .save_profile(profile)
                .await
                .map_err(stage(ImportStage::Profile))?;
        }

        self.apply_exercises(&document.exercises)
            .await
            .map_err(stage(ImportStage::Exercises))?;
        self.apply_routines(&document.routines)
            .await
            .map_err(stage(ImportStage::Routines))?;
        self.apply_sessions(&document.sessions)
            .await
            .map_err(stage(ImportStage::Sessions))?;
        self.apply_measurements(&document.measurements)
            .await
            .map_err(stage(ImportStage::Measurements))?;

        tracing::info!(
            exercises = document.exercises.len(),
            routines = document.routines.len(),
            sessions = document.sessions.len(),
            measurements = document.measurements.len(),
            "import applied"
        );
        Ok(())
    }

    /// Replace the custom exercises only. Records in the document that are
    /// not flagged custom are ignored: seeded data is regenerated at first
    /// run, never imported.
    async fn apply_exercises(&self, exercises: &[Exercise]) -> Result<(), StorageError> {
        self.store.clear_custom_exercises().await?;
        for exercise in exercises.iter().filter(|ex| ex.is_custom) {
            self.store.put_exercise(exercise).await?;
        }
        Ok(())
    }

    async fn apply_routines(&self, routines: &[Routine]) -> Result<(), StorageError> {
        self.store.clear_routines().await?;
        for routine in routines {
            self.store.put_routine(routine).await?;
        }
        Ok(())
    }

    async fn apply_sessions(&self, sessions: &[Session]) -> Result<(), StorageError> {
        self.store.clear_sessions().await?;
        for session in sessions {
            self.store.put_session(session).await?;
        }
        Ok(())
    }

    async fn apply_measurements(&self, measurements: &[Measurement]) -> Result<(), StorageError> {
        self.store.clear_measurements().await?;
        for measurement in measurements {
            self.store.put_measurement(measurement).await?;
        }
        Ok(())
    }
}
