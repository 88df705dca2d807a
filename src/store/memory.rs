//! In-memory stores backed by `Mutex<HashMap>`.
//!
//! Nothing survives the process. Used by tests and by the default
//! `memory` storage configuration.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::errors::{StoreError, StoreResult};
use super::traits::{AnalysisStore, RecordId, RecordStore, SchemaStore};
use crate::record::Record;
use crate::schema::SchemaTree;
use crate::stats::AnalysisRecord;

// A panic while holding one of these locks cannot leave a map half-written,
// so a poisoned guard is still usable.
fn guard<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct MemorySchemaStore {
    schemas: Mutex<HashMap<String, SchemaTree>>,
}

impl MemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchemaStore for MemorySchemaStore {
    fn insert(&self, id: &str, schema: &SchemaTree) -> StoreResult<()> {
        let mut schemas = guard(&self.schemas);
        if schemas.contains_key(id) {
            return Err(StoreError::AlreadyExists { id: id.to_string() });
        }
        schemas.insert(id.to_string(), schema.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> StoreResult<Option<SchemaTree>> {
        Ok(guard(&self.schemas).get(id).cloned())
    }

    fn ids(&self) -> StoreResult<Vec<String>> {
        let mut ids: Vec<String> = guard(&self.schemas).keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, Vec<(RecordId, Record)>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn insert(&self, id: &str, record: &Record) -> StoreResult<RecordId> {
        let record_id = RecordId::new();
        guard(&self.records)
            .entry(id.to_string())
            .or_default()
            .push((record_id, record.clone()));
        Ok(record_id)
    }

    fn scan(&self, id: &str) -> StoreResult<Vec<Record>> {
        Ok(guard(&self.records)
            .get(id)
            .map(|rows| rows.iter().map(|(_, r)| r.clone()).collect())
            .unwrap_or_default())
    }

    fn count(&self, id: &str) -> StoreResult<u64> {
        Ok(guard(&self.records).get(id).map_or(0, |rows| rows.len() as u64))
    }
}

#[derive(Debug, Default)]
pub struct MemoryAnalysisStore {
    analyses: Mutex<HashMap<String, AnalysisRecord>>,
}

impl MemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalysisStore for MemoryAnalysisStore {
    fn get(&self, id: &str) -> StoreResult<Option<AnalysisRecord>> {
        Ok(guard(&self.analyses).get(id).cloned())
    }

    fn put(&self, analysis: &AnalysisRecord) -> StoreResult<()> {
        guard(&self.analyses).insert(analysis.id.clone(), analysis.clone());
        Ok(())
    }
}
