//! Connection manager for the embedded SQLite database.
//!
//! Owns the single live handle per store instance. `open()` returns the
//! cached pool while it is live, serializes concurrent first opens onto one
//! connect, and re-establishes the connection transparently when the handle
//! was closed by an external actor.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use tokio::sync::Mutex;

use crate::store::schema;
use crate::store::StorageError;

/// Default maximum connections in the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the database lives.
#[derive(Debug, Clone)]
pub enum Location {
    /// File-backed database, created on first open.
    File(PathBuf),
    /// Private in-memory database, pinned to a single connection.
    Memory,
}

/// Owner of the at-most-one open connection handle.
///
/// # Configuration
///
/// - WAL journal mode for better concurrency
/// - Normal synchronous mode for performance with durability
/// - Create database file (and parent directory) if missing
pub struct Database {
    location: Location,
    max_connections: u32,
    handle: Mutex<Option<SqlitePool>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Create a manager for a file-backed database.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_location(Location::File(path.as_ref().to_path_buf()))
    }

    /// Create a manager for the given location.
    pub fn with_location(location: Location) -> Self {
        Self {
            location,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            handle: Mutex::new(None),
        }
    }

    /// Set the connection pool size. Ignored for in-memory databases, which
    /// always use a single connection (each connection would otherwise get a
    /// private database).
    pub fn max_connections(mut self, size: u32) -> Self {
        self.max_connections = size;
        self
    }

    /// Open (or return) the live connection handle.
    ///
    /// The first successful open creates the schema; callers racing on the
    /// first open all resolve to the same pool. If the cached handle was
    /// closed externally, a fresh connection is established in its place.
    /// A failed connect surfaces as [`StorageError::Unavailable`] and is
    /// fatal to the calling operation.
    pub async fn open(&self) -> Result<SqlitePool, StorageError> {
        let mut handle = self.handle.lock().await;

        if let Some(pool) = handle.as_ref() {
            if !pool.is_closed() {
                return Ok(pool.clone());
            }
            tracing::warn!("database handle was closed externally, reopening");
            *handle = None;
        }

        let pool = self.connect().await.map_err(StorageError::Unavailable)?;
        schema::init_schema(&pool).await?;
        schema::verify_schema(&pool).await?;

        *handle = Some(pool.clone());
        Ok(pool)
    }

    async fn connect(&self) -> Result<SqlitePool, sqlx::Error> {
        let (options, max_connections) = match &self.location {
            Location::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
                    }
                }
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal);
                (options, self.max_connections)
            }
            Location::Memory => (SqliteConnectOptions::new().in_memory(true), 1),
        };

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(DEFAULT_CONNECT_TIMEOUT);
        if matches!(self.location, Location::Memory) {
            // The sole connection is the database; never recycle it.
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        pool_options.connect_with(options).await
    }

    /// Close the handle gracefully. The next `open()` reconnects.
    pub async fn close(&self) {
        if let Some(pool) = self.handle.lock().await.take() {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_caches_handle() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("store.db"));

        let first = db.open().await.unwrap();
        let second = db.open().await.unwrap();

        // Same underlying pool, not a second connection set
        assert!(!first.is_closed());
        assert!(!second.is_closed());

        let row: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&second)
            .await
            .unwrap();
        assert_eq!(row.0, 1);
    }

    #[tokio::test]
    async fn test_reopen_after_external_close() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("store.db"));

        let pool = db.open().await.unwrap();
        pool.close().await;
        assert!(pool.is_closed());

        let reopened = db.open().await.unwrap();
        assert!(!reopened.is_closed());

        let row: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&reopened)
            .await
            .unwrap();
        assert_eq!(row.0, 1);
    }

    #[tokio::test]
    async fn test_open_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("data").join("store.db");
        let db = Database::new(&nested);

        db.open().await.unwrap();
        assert!(nested.exists());
    }

    #[tokio::test]
    async fn test_open_creates_schema() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("store.db"));
        let pool = db.open().await.unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'exercises'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_wal_mode() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("store.db"));
        let pool = db.open().await.unwrap();

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::with_location(Location::Memory);
        let pool = db.open().await.unwrap();

        sqlx::query("INSERT INTO profile (id, data) VALUES ('singleton', '{}')")
            .execute(&pool)
            .await
            .unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profile")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
