//! Portable document format and validation.
//!
//! The envelope wraps the full user-created contents of the store. Seeded
//! exercises never travel in it: export filters them out, import ignores
//! them, and they are regenerated from the catalog at first run.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{Exercise, Measurement, Profile, Routine, Session};

/// Current version of the portable document format. Bump when the structure
/// changes; documents with a newer version are rejected, never
/// best-effort-imported.
pub const EXPORT_VERSION: u32 = 1;

/// App name used as the export file prefix.
const APP_NAME: &str = "liftlog";

/// Required top-level fields of a portable document.
const REQUIRED_FIELDS: [&str; 6] = [
    "version",
    "exportedAt",
    "exercises",
    "routines",
    "sessions",
    "measurements",
];

/// The versioned portable snapshot produced by export and consumed by import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: u32,
    /// Export timestamp, epoch milliseconds.
    pub exported_at: i64,
    pub profile: Option<Profile>,
    /// Custom exercises only.
    pub exercises: Vec<Exercise>,
    pub routines: Vec<Routine>,
    pub sessions: Vec<Session>,
    pub measurements: Vec<Measurement>,
}

/// Why a candidate document was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Offending top-level field.
    pub field: &'static str,
    pub reason: String,
}

impl ValidationFailure {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Structurally validate a candidate document.
///
/// Pure: no store access, no mutation. Checks presence of the required
/// top-level fields, a supported positive-integer version, a positive
/// numeric export timestamp, and that every collection field is a list.
pub fn validate_document(document: &Value) -> Result<(), ValidationFailure> {
    if !document.is_object() {
        return Err(ValidationFailure::new(
            "document",
            "not a JSON object".to_string(),
        ));
    }

    for field in REQUIRED_FIELDS {
        if document.get(field).is_none() {
            return Err(ValidationFailure::new(field, "required field is missing"));
        }
    }

    let version = &document["version"];
    match version.as_i64() {
        Some(v) if v >= 1 => {
            if v > i64::from(EXPORT_VERSION) {
                return Err(ValidationFailure::new(
                    "version",
                    format!("version {v} is newer than supported version {EXPORT_VERSION}"),
                ));
            }
        }
        _ => {
            return Err(ValidationFailure::new(
                "version",
                format!("expected a positive integer, got {version}"),
            ));
        }
    }

    let exported_at = &document["exportedAt"];
    if !exported_at.as_f64().map(|v| v > 0.0).unwrap_or(false) {
        return Err(ValidationFailure::new(
            "exportedAt",
            "expected a positive numeric timestamp",
        ));
    }

    for field in ["exercises", "routines", "sessions", "measurements"] {
        if !document[field].is_array() {
            return Err(ValidationFailure::new(field, "expected a list"));
        }
    }

    Ok(())
}

/// File name for an export taken at `exported_at` (epoch ms):
/// `liftlog-<DD-MM-YYYY>.json`.
pub fn export_file_name(exported_at: i64) -> String {
    let date = DateTime::from_timestamp_millis(exported_at).unwrap_or(DateTime::UNIX_EPOCH);
    format!("{APP_NAME}-{}.json", date.format("%d-%m-%Y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_document() -> Value {
        json!({
            "version": 1,
            "exportedAt": 1_700_000_000_000_i64,
            "profile": null,
            "exercises": [],
            "routines": [],
            "sessions": [],
            "measurements": [],
        })
    }

    #[test]
    fn test_valid_document_accepted() {
        assert!(validate_document(&minimal_document()).is_ok());
    }

    #[test]
    fn test_non_object_rejected() {
        for document in [json!(null), json!(42), json!("a string"), json!([1, 2])] {
            let failure = validate_document(&document).unwrap_err();
            assert_eq!(failure.field, "document");
        }
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        for field in [
            "version",
            "exportedAt",
            "exercises",
            "routines",
            "sessions",
            "measurements",
        ] {
            let mut document = minimal_document();
            document.as_object_mut().unwrap().remove(field);
            let failure = validate_document(&document).unwrap_err();
            assert_eq!(failure.field, field, "expected failure on {field}");
        }

        // profile is optional
        let mut document = minimal_document();
        document.as_object_mut().unwrap().remove("profile");
        assert!(validate_document(&document).is_ok());
    }

    #[test]
    fn test_bad_versions_rejected() {
        for version in [json!(0), json!(-1), json!(1.5), json!("1"), json!(null)] {
            let mut document = minimal_document();
            document["version"] = version.clone();
            let failure = validate_document(&document).unwrap_err();
            assert_eq!(failure.field, "version", "expected failure on {version}");
        }
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut document = minimal_document();
        document["version"] = json!(EXPORT_VERSION + 1);
        let failure = validate_document(&document).unwrap_err();
        assert_eq!(failure.field, "version");
        assert!(failure.reason.contains("newer"));
    }

    #[test]
    fn test_bad_export_timestamp_rejected() {
        for stamp in [json!(0), json!(-5), json!("yesterday"), json!(null)] {
            let mut document = minimal_document();
            document["exportedAt"] = stamp;
            let failure = validate_document(&document).unwrap_err();
            assert_eq!(failure.field, "exportedAt");
        }
    }

    #[test]
    fn test_non_list_collections_rejected() {
        for field in ["exercises", "routines", "sessions", "measurements"] {
            let mut document = minimal_document();
            document[field] = json!({"not": "a list"});
            let failure = validate_document(&document).unwrap_err();
            assert_eq!(failure.field, field);
        }
    }

    #[test]
    fn test_export_file_name_format() {
        // 2026-02-20 12:00:00 UTC
        assert_eq!(export_file_name(1_771_588_800_000), "liftlog-20-02-2026.json");
    }

    #[test]
    fn test_document_round_trips() {
        let document = ExportDocument {
            version: EXPORT_VERSION,
            exported_at: 1_700_000_000_000,
            profile: Some(Profile::default_record(1_000)),
            exercises: vec![Exercise::custom("Zercher Squat", "barbell", "legs")],
            routines: vec![Routine::new("Push Day")],
            sessions: Vec::new(),
            measurements: vec![Measurement::new("weight", 82.5, "kg", 1_000)],
        };

        let json = serde_json::to_string_pretty(&document).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert!(validate_document(&value).is_ok());

        let back: ExportDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back, document);
    }
}
