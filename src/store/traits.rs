//! Collaborator store traits
//!
//! Synchronous and `Send + Sync`, so one bundle can be shared by the
//! stdin loop and the HTTP server alike. Implementations provide their
//! own interior locking; callers needing read-modify-write atomicity
//! across calls serialize at a higher level.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::StoreResult;
use super::file::{FileAnalysisStore, FileRecordStore, FileSchemaStore};
use super::memory::{MemoryAnalysisStore, MemoryRecordStore, MemorySchemaStore};
use crate::record::Record;
use crate::schema::SchemaTree;
use crate::stats::AnalysisRecord;

/// Identifier assigned to each stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Registered schemas, write-once per identifier
pub trait SchemaStore: Send + Sync {
    /// Fails with `StoreError::AlreadyExists` when `id` is taken.
    fn insert(&self, id: &str, schema: &SchemaTree) -> StoreResult<()>;

    fn get(&self, id: &str) -> StoreResult<Option<SchemaTree>>;

    /// Registered identifiers, sorted
    fn ids(&self) -> StoreResult<Vec<String>>;
}

/// Accepted records, append-only per schema identifier
pub trait RecordStore: Send + Sync {
    fn insert(&self, id: &str, record: &Record) -> StoreResult<RecordId>;

    /// Every record stored under `id`, in insertion order
    fn scan(&self, id: &str) -> StoreResult<Vec<Record>>;

    fn count(&self, id: &str) -> StoreResult<u64>;
}

/// One analysis record per schema identifier, replaced whole
pub trait AnalysisStore: Send + Sync {
    fn get(&self, id: &str) -> StoreResult<Option<AnalysisRecord>>;

    fn put(&self, analysis: &AnalysisRecord) -> StoreResult<()>;
}

/// The three collaborators, opened together
#[derive(Clone)]
pub struct Stores {
    pub schemas: Arc<dyn SchemaStore>,
    pub records: Arc<dyn RecordStore>,
    pub analyses: Arc<dyn AnalysisStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            schemas: Arc::new(MemorySchemaStore::new()),
            records: Arc::new(MemoryRecordStore::new()),
            analyses: Arc::new(MemoryAnalysisStore::new()),
        }
    }

    /// Opens (creating if needed) the file backend rooted at `data_dir`.
    ///
    /// # Errors
    ///
    /// `StoreError::Io` when a directory cannot be created, and
    /// `StoreError::Corruption` when a stored schema does not parse.
    pub fn open_dir(data_dir: &Path) -> StoreResult<Self> {
        Ok(Self {
            schemas: Arc::new(FileSchemaStore::open(data_dir)?),
            records: Arc::new(FileRecordStore::open(data_dir)?),
            analyses: Arc::new(FileAnalysisStore::open(data_dir)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_ids_are_unique() {
        assert_ne!(RecordId::new(), RecordId::new());
    }

    #[test]
    fn test_record_id_serializes_as_plain_uuid() {
        let id = RecordId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }
}
