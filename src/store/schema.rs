//! Collection schema: static descriptor and DDL.
//!
//! Every collection is a single table holding JSON documents:
//! an `id TEXT PRIMARY KEY` column plus a `data TEXT` column with the
//! serialized record. Indexed fields are virtual generated columns over
//! `json_extract`, so secondary indexes always reflect the stored document.
//!
//! The descriptor below is the one source of truth: table and index DDL is
//! generated from it at open time, and the generic collection operations
//! resolve collection/index names against it before any SQL is built.

use sqlx::sqlite::SqlitePool;

use crate::store::StorageError;

/// Collection holding seeded and user-created exercises.
pub const EXERCISES: &str = "exercises";
/// Collection holding workout routine templates.
pub const ROUTINES: &str = "routines";
/// Collection holding finished workout sessions.
pub const SESSIONS: &str = "sessions";
/// Collection holding body measurements.
pub const MEASUREMENTS: &str = "measurements";
/// Collection holding the singleton user profile.
pub const PROFILE: &str = "profile";

/// SQL affinity of an indexed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
}

impl ColumnType {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
        }
    }
}

/// One indexed field extracted from the record document.
#[derive(Debug, Clone, Copy)]
pub struct IndexedField {
    /// Generated column name.
    pub column: &'static str,
    /// JSON path of the field inside the record.
    pub json_path: &'static str,
    /// Column affinity, which drives index key ordering.
    pub column_type: ColumnType,
}

/// A named secondary index over one or more indexed fields.
#[derive(Debug, Clone, Copy)]
pub struct IndexDef {
    /// Index name used by the query API.
    pub name: &'static str,
    /// Columns the index covers, in key order.
    pub columns: &'static [&'static str],
    /// Whether the index enforces uniqueness.
    pub unique: bool,
}

/// A named collection of JSON records with one primary key and its indexes.
#[derive(Debug, Clone, Copy)]
pub struct CollectionDef {
    /// Collection (table) name.
    pub name: &'static str,
    /// Fields materialized as generated columns.
    pub fields: &'static [IndexedField],
    /// Declared secondary indexes.
    pub indexes: &'static [IndexDef],
}

impl CollectionDef {
    /// Look up a declared index by name.
    pub fn index(&self, name: &str) -> Option<&'static IndexDef> {
        self.indexes.iter().find(|idx| idx.name == name)
    }
}

/// All collections the store manages.
pub static SCHEMA: &[CollectionDef] = &[
    CollectionDef {
        name: EXERCISES,
        fields: &[
            IndexedField {
                column: "name",
                json_path: "$.name",
                column_type: ColumnType::Text,
            },
            IndexedField {
                column: "muscle_group",
                json_path: "$.muscleGroup",
                column_type: ColumnType::Text,
            },
            IndexedField {
                column: "is_archived",
                json_path: "$.isArchived",
                column_type: ColumnType::Integer,
            },
            IndexedField {
                column: "category",
                json_path: "$.category",
                column_type: ColumnType::Text,
            },
        ],
        indexes: &[
            IndexDef {
                name: "name",
                columns: &["name"],
                unique: true,
            },
            IndexDef {
                name: "muscle_group",
                columns: &["muscle_group"],
                unique: false,
            },
            IndexDef {
                name: "is_archived",
                columns: &["is_archived"],
                unique: false,
            },
            IndexDef {
                name: "category",
                columns: &["category"],
                unique: false,
            },
        ],
    },
    CollectionDef {
        name: ROUTINES,
        fields: &[IndexedField {
            column: "last_used_at",
            json_path: "$.lastUsedAt",
            column_type: ColumnType::Integer,
        }],
        indexes: &[IndexDef {
            name: "last_used_at",
            columns: &["last_used_at"],
            unique: false,
        }],
    },
    CollectionDef {
        name: SESSIONS,
        fields: &[
            IndexedField {
                column: "start_time",
                json_path: "$.startTime",
                column_type: ColumnType::Integer,
            },
            IndexedField {
                column: "routine_id",
                json_path: "$.routineId",
                column_type: ColumnType::Text,
            },
        ],
        indexes: &[
            IndexDef {
                name: "start_time",
                columns: &["start_time"],
                unique: false,
            },
            IndexDef {
                name: "routine_id",
                columns: &["routine_id"],
                unique: false,
            },
        ],
    },
    CollectionDef {
        name: MEASUREMENTS,
        fields: &[
            IndexedField {
                column: "type",
                json_path: "$.type",
                column_type: ColumnType::Text,
            },
            IndexedField {
                column: "date",
                json_path: "$.date",
                column_type: ColumnType::Integer,
            },
        ],
        indexes: &[
            IndexDef {
                name: "type",
                columns: &["type"],
                unique: false,
            },
            IndexDef {
                name: "date",
                columns: &["date"],
                unique: false,
            },
            IndexDef {
                name: "type_date",
                columns: &["type", "date"],
                unique: false,
            },
        ],
    },
    CollectionDef {
        name: PROFILE,
        fields: &[],
        indexes: &[],
    },
];

/// Look up a collection by name.
pub fn collection(name: &str) -> Option<&'static CollectionDef> {
    SCHEMA.iter().find(|def| def.name == name)
}

fn table_ddl(def: &CollectionDef) -> String {
    let mut ddl = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    id   TEXT PRIMARY KEY,\n    data TEXT NOT NULL",
        def.name
    );
    for field in def.fields {
        ddl.push_str(&format!(
            ",\n    {} {} GENERATED ALWAYS AS (json_extract(data, '{}')) VIRTUAL",
            field.column,
            field.column_type.as_sql(),
            field.json_path
        ));
    }
    ddl.push_str("\n)");
    ddl
}

fn index_ddl(def: &CollectionDef, index: &IndexDef) -> String {
    format!(
        "CREATE {}INDEX IF NOT EXISTS idx_{}_{} ON {} ({})",
        if index.unique { "UNIQUE " } else { "" },
        def.name,
        index.name,
        def.name,
        index.columns.join(", ")
    )
}

/// Initialize the database schema.
///
/// Creates all declared collections and their indexes if they don't exist.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), StorageError> {
    for def in SCHEMA {
        sqlx::query(&table_ddl(def)).execute(pool).await?;
        for index in def.indexes {
            sqlx::query(&index_ddl(def, index)).execute(pool).await?;
        }
    }

    tracing::info!("database schema initialized");
    Ok(())
}

/// Check the live database against the declared schema.
///
/// Runs once per fresh connection, after [`init_schema`]. A missing table
/// means the engine and the descriptor disagree and nothing can be trusted.
pub async fn verify_schema(pool: &SqlitePool) -> Result<(), StorageError> {
    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table'")
            .fetch_all(pool)
            .await?;

    for def in SCHEMA {
        if !tables.iter().any(|t| t == def.name) {
            return Err(StorageError::Schema(format!(
                "collection table {} is missing",
                def.name
            )));
        }
    }

    Ok(())
}
