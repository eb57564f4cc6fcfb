//! liftlog - Offline Persistence Core
//!
//! This crate is the data layer of a fitness-tracking client: a local,
//! offline-capable structured store with typed collections, secondary-index
//! queries, a singleton profile record, a reactive state bus, and an
//! export/import subsystem that round-trips the store through a versioned
//! portable document.
//!
//! # Architecture
//!
//! - **Store**: SQLite-backed collections of JSON records (exercises,
//!   routines, sessions, measurements, profile) behind a single managed
//!   connection, with an idempotent first-run bootstrap that seeds the
//!   reference exercise catalog and the default profile
//! - **State bus**: process-wide observable key/value map for ephemeral
//!   cross-cutting state, decoupled from persistence
//! - **Transfer**: export to and import from a versioned JSON document,
//!   where only user-created records travel and seeded data is regenerated
//!
//! # Example
//!
//! ```rust,no_run
//! use liftlog::store::{Exercise, StoreBuilder};
//! use liftlog::transfer::TransferEngine;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = StoreBuilder::new("data/liftlog.db").build().await?;
//!     store.initialize().await?;
//!
//!     store
//!         .put_exercise(&Exercise::custom("Zercher Squat", "barbell", "legs"))
//!         .await?;
//!
//!     let engine = TransferEngine::new(store.clone());
//!     let snapshot = engine.export_json().await?;
//!     println!("{snapshot}");
//!     Ok(())
//! }
//! ```

pub mod state;
pub mod store;
pub mod transfer;

pub use state::{StateBus, StateKey, SubscriptionId};
pub use store::{StorageError, Store, StoreBuilder};
pub use transfer::{ImportReport, TransferEngine};
