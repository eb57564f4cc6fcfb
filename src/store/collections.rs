//! Generic typed CRUD and index queries over the declared collections.
//!
//! Every operation resolves its collection (and index) against the static
//! schema descriptor before building SQL, opens or reuses the connection
//! through the manager, and runs as a single statement — one collection, one
//! access mode, no multi-collection transactions. Cross-collection
//! consistency is an application concern.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::store::db::Database;
use crate::store::schema::{self, CollectionDef, IndexDef};
use crate::store::StorageError;

/// Append each key component to a record query, dispatching on its type.
macro_rules! bind_components {
    ($query:ident, $key:expr) => {
        for component in $key.components() {
            $query = match component {
                IndexValue::Integer(v) => $query.bind(*v),
                IndexValue::Real(v) => $query.bind(*v),
                IndexValue::Text(v) => $query.bind(v.as_str()),
                IndexValue::Bool(v) => $query.bind(*v),
            };
        }
    };
}

/// A value bound against an indexed column.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
}

impl From<i64> for IndexValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for IndexValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for IndexValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for IndexValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for IndexValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for IndexValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Ordered lookup key for an index; one component per indexed column.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexKey(Vec<IndexValue>);

impl IndexKey {
    /// Key for a single-column index.
    pub fn single(value: impl Into<IndexValue>) -> Self {
        Self(vec![value.into()])
    }

    /// Key for a compound index, components in declared column order.
    pub fn compound(parts: impl IntoIterator<Item = IndexValue>) -> Self {
        Self(parts.into_iter().collect())
    }

    fn components(&self) -> &[IndexValue] {
        &self.0
    }
}

impl From<IndexValue> for IndexKey {
    fn from(value: IndexValue) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<IndexValue>> for IndexKey {
    fn from(parts: Vec<IndexValue>) -> Self {
        Self(parts)
    }
}

/// Generic record operations over the declared collections.
#[derive(Clone)]
pub struct CollectionStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionStore").finish_non_exhaustive()
    }
}

impl CollectionStore {
    pub(crate) fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn def(collection: &str) -> Result<&'static CollectionDef, StorageError> {
        schema::collection(collection)
            .ok_or_else(|| StorageError::UnknownCollection(collection.to_string()))
    }

    fn index(def: &CollectionDef, index: &str) -> Result<&'static IndexDef, StorageError> {
        def.index(index).ok_or_else(|| StorageError::UnknownIndex {
            collection: def.name.to_string(),
            index: index.to_string(),
        })
    }

    fn check_arity(index: &IndexDef, key: &IndexKey) -> Result<(), StorageError> {
        if key.components().len() != index.columns.len() {
            return Err(StorageError::IndexKeyArity {
                index: index.name.to_string(),
                expected: index.columns.len(),
                got: key.components().len(),
            });
        }
        Ok(())
    }

    fn decode<T: DeserializeOwned>(rows: Vec<(String,)>) -> Result<Vec<T>, StorageError> {
        rows.into_iter()
            .map(|(data,)| serde_json::from_str(&data).map_err(StorageError::from))
            .collect()
    }

    /// Fetch a record by primary key. A missing record is `Ok(None)`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, StorageError> {
        let def = Self::def(collection)?;
        let pool = self.db.open().await?;

        let sql = format!("SELECT data FROM {} WHERE id = ?1", def.name);
        let row: Option<(String,)> = sqlx::query_as(&sql).bind(id).fetch_optional(&pool).await?;

        row.map(|(data,)| serde_json::from_str(&data))
            .transpose()
            .map_err(StorageError::from)
    }

    /// Upsert a record. The record must carry its own string `id` field;
    /// returns the key it was stored under.
    pub async fn put<T: Serialize>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<String, StorageError> {
        let def = Self::def(collection)?;
        let document = serde_json::to_value(record)?;
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                StorageError::InvalidRecord(format!(
                    "record for {} is missing a string id field",
                    def.name
                ))
            })?
            .to_string();

        let pool = self.db.open().await?;
        let sql = format!(
            "INSERT INTO {} (id, data) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
            def.name
        );
        sqlx::query(&sql)
            .bind(&id)
            .bind(document.to_string())
            .execute(&pool)
            .await?;

        Ok(id)
    }

    /// Delete a record by primary key. Deleting a missing record is a no-op.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), StorageError> {
        let def = Self::def(collection)?;
        let pool = self.db.open().await?;

        let sql = format!("DELETE FROM {} WHERE id = ?1", def.name);
        sqlx::query(&sql).bind(id).execute(&pool).await?;
        Ok(())
    }

    /// Fetch every record in the collection, in no particular order.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, StorageError> {
        let def = Self::def(collection)?;
        let pool = self.db.open().await?;

        let sql = format!("SELECT data FROM {}", def.name);
        let rows: Vec<(String,)> = sqlx::query_as(&sql).fetch_all(&pool).await?;
        Self::decode(rows)
    }

    /// Fetch records whose index key equals `key`.
    pub async fn get_by_index<T: DeserializeOwned>(
        &self,
        collection: &str,
        index: &str,
        key: impl Into<IndexKey>,
    ) -> Result<Vec<T>, StorageError> {
        let def = Self::def(collection)?;
        let idx = Self::index(def, index)?;
        let key = key.into();
        Self::check_arity(idx, &key)?;

        let pool = self.db.open().await?;
        let predicate = idx
            .columns
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sql = format!("SELECT data FROM {} WHERE {}", def.name, predicate);

        let mut query = sqlx::query_as(&sql);
        bind_components!(query, key);
        let rows: Vec<(String,)> = query.fetch_all(&pool).await?;
        Self::decode(rows)
    }

    /// Fetch records whose index key lies in `[lower, upper]`, both bounds
    /// inclusive. Compound keys compare as ordered tuples; results come back
    /// in index key order.
    pub async fn get_by_index_range<T: DeserializeOwned>(
        &self,
        collection: &str,
        index: &str,
        lower: impl Into<IndexKey>,
        upper: impl Into<IndexKey>,
    ) -> Result<Vec<T>, StorageError> {
        let def = Self::def(collection)?;
        let idx = Self::index(def, index)?;
        let lower = lower.into();
        let upper = upper.into();
        Self::check_arity(idx, &lower)?;
        Self::check_arity(idx, &upper)?;

        let pool = self.db.open().await?;
        let key_order = idx.columns.join(", ");
        let sql = if idx.columns.len() == 1 {
            let column = idx.columns[0];
            format!(
                "SELECT data FROM {} WHERE {column} >= ? AND {column} <= ? ORDER BY {key_order}",
                def.name
            )
        } else {
            let tuple = format!("({})", idx.columns.join(", "));
            let placeholders = format!(
                "({})",
                idx.columns.iter().map(|_| "?").collect::<Vec<_>>().join(", ")
            );
            format!(
                "SELECT data FROM {} WHERE {tuple} >= {placeholders} AND {tuple} <= {placeholders} ORDER BY {key_order}",
                def.name
            )
        };

        let mut query = sqlx::query_as(&sql);
        bind_components!(query, lower);
        bind_components!(query, upper);
        let rows: Vec<(String,)> = query.fetch_all(&pool).await?;
        Self::decode(rows)
    }

    /// Remove every record in the collection in one atomic step.
    pub async fn clear(&self, collection: &str) -> Result<(), StorageError> {
        let def = Self::def(collection)?;
        let pool = self.db.open().await?;

        let sql = format!("DELETE FROM {}", def.name);
        sqlx::query(&sql).execute(&pool).await?;
        Ok(())
    }

    /// Number of records in the collection.
    pub async fn count(&self, collection: &str) -> Result<u64, StorageError> {
        let def = Self::def(collection)?;
        let pool = self.db.open().await?;

        let sql = format!("SELECT COUNT(*) FROM {}", def.name);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&pool).await?;
        Ok(count.try_into().unwrap_or(0))
    }
}
