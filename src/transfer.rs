//! Export/Import Engine
//!
//! Serializes the store into a versioned portable document and restores it
//! from one, preserving the referential rules: only user-created records
//! travel; seeded reference data is regenerated at first run, never
//! persisted in the document.
//!
//! # Components
//!
//! - [`ExportDocument`]: The versioned envelope, plus [`validate_document`]
//! - [`TransferEngine`]: Export gathering and the import state machine
//! - [`ImportReport`] / [`ImportOutcome`]: Structured results for callers
//! - [`ImportError`]: Failure taxonomy (corrupt, invalid, partial apply)

mod document;
mod engine;

pub use document::{export_file_name, validate_document, ExportDocument, ValidationFailure, EXPORT_VERSION};
pub use engine::{
    ImportError, ImportOutcome, ImportReport, ImportStage, ImportSummary, TransferEngine,
};
