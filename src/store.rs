//! Persistence Layer
//!
//! Local, offline-capable structured store over embedded SQLite:
//! typed collections of JSON records with secondary-index queries,
//! a singleton profile record, and an idempotent first-run bootstrap.
//!
//! # Components
//!
//! - [`Database`]: Single-handle connection manager with transparent reopen
//! - [`CollectionStore`]: Generic CRUD + index-query primitives
//! - [`Store`] / [`StoreBuilder`]: Typed per-entity facade and configuration
//! - [`InitReport`]: Outcome of the first-run seed/profile bootstrap
//! - [`StorageError`]: Failure taxonomy for every operation above

mod collections;
mod db;
mod error;
mod facade;
mod init;
mod records;
mod schema;
mod seed;

pub use collections::{CollectionStore, IndexKey, IndexValue};
pub use db::{Database, Location};
pub use error::StorageError;
pub use facade::{Store, StoreBuilder};
pub use init::InitReport;
pub use records::{
    BarSpec, BestSet, DashboardWidget, Exercise, IncompleteSetPolicy, Measurement, PlateSpec,
    PreviousSetsMode, Profile, RestTimerSettings, Routine, RoutineExercise, Session,
    SessionExercise, SetKind, SetSpec, Settings, PROFILE_SENTINEL_ID,
};
pub use schema::{
    collection, ColumnType, CollectionDef, IndexDef, IndexedField, EXERCISES, MEASUREMENTS,
    PROFILE, ROUTINES, SESSIONS, SCHEMA,
};
