//! File-backed stores rooted at a data directory.
//!
//! Layout:
//! - `schemas/schema_<id>.json`: wire-format field array, loaded at open
//! - `records/<id>.jsonl`: one checksummed line per accepted record
//! - `analysis/analysis_<id>.json`: replaced atomically on every put
//!
//! Record appends are fsynced before `insert` returns. Analysis and
//! schema files go through write-temp, fsync, rename, so readers never
//! see a partial file. Identifiers are validated before they reach a
//! store, so they are safe to embed in file names.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::checksum::{body_checksum, verify_body};
use super::errors::{StoreError, StoreResult};
use super::traits::{AnalysisStore, RecordId, RecordStore, SchemaStore};
use crate::record::Record;
use crate::schema::SchemaTree;
use crate::stats::AnalysisRecord;

const SCHEMA_DIR: &str = "schemas";
const RECORD_DIR: &str = "records";
const ANALYSIS_DIR: &str = "analysis";

fn guard<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

fn ensure_dir(path: &Path) -> StoreResult<()> {
    fs::create_dir_all(path).map_err(|e| StoreError::io(path, e))
}

/// Write `bytes` to `path` via a sibling temp file: write, fsync, rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
        file.write_all(bytes).map_err(|e| StoreError::io(&tmp, e))?;
        file.sync_all().map_err(|e| StoreError::io(&tmp, e))?;
    }
    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
}

/// Read a file, `None` when it does not exist.
fn read_optional(path: &Path) -> StoreResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Schemas are immutable, so all of them are kept in memory after open.
pub struct FileSchemaStore {
    dir: PathBuf,
    schemas: Mutex<HashMap<String, SchemaTree>>,
}

impl FileSchemaStore {
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let dir = data_dir.join(SCHEMA_DIR);
        ensure_dir(&dir)?;

        let mut schemas = HashMap::new();
        let entries = fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&dir, e))?.path();
            let Some(id) = schema_id_from_path(&path) else {
                continue;
            };
            let bytes = fs::read(&path).map_err(|e| StoreError::io(&path, e))?;
            let raw: serde_json::Value = serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::corruption(&path, e.to_string()))?;
            let schema =
                SchemaTree::parse(&raw).map_err(|e| StoreError::corruption(&path, e.to_string()))?;
            schemas.insert(id, schema);
        }

        Ok(Self {
            dir,
            schemas: Mutex::new(schemas),
        })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("schema_{}.json", id))
    }
}

fn schema_id_from_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let id = name.strip_prefix("schema_")?.strip_suffix(".json")?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

impl SchemaStore for FileSchemaStore {
    fn insert(&self, id: &str, schema: &SchemaTree) -> StoreResult<()> {
        let mut schemas = guard(&self.schemas);
        if schemas.contains_key(id) {
            return Err(StoreError::AlreadyExists { id: id.to_string() });
        }
        let bytes = serde_json::to_vec_pretty(schema)
            .map_err(|e| StoreError::serialization(format!("schema '{}'", id), e))?;
        write_atomic(&self.path_for(id), &bytes)?;
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

/// One line of `records/<id>.jsonl`
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    record_id: RecordId,
    received_at: DateTime<Utc>,
    checksum: u32,
    body: serde_json::Value,
}

pub struct FileRecordStore {
    dir: PathBuf,
    /// Serializes appends so lines never interleave
    append_lock: Mutex<()>,
}

impl FileRecordStore {
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let dir = data_dir.join(RECORD_DIR);
        ensure_dir(&dir)?;
        Ok(Self {
            dir,
            append_lock: Mutex::new(()),
        })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", id))
    }

    fn read_lines(&self, id: &str) -> StoreResult<Vec<StoredRecord>> {
        let path = self.path_for(id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        let mut rows = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| StoreError::io(&path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let row: StoredRecord = serde_json::from_str(&line).map_err(|e| {
                StoreError::corruption(&path, format!("line {}: {}", index + 1, e))
            })?;
            if !verify_body(&row.body, row.checksum) {
                return Err(StoreError::corruption(
                    &path,
                    format!("line {}: checksum mismatch for record {}", index + 1, row.record_id),
                ));
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

impl RecordStore for FileRecordStore {
    fn insert(&self, id: &str, record: &Record) -> StoreResult<RecordId> {
        let body = record.to_json();
        let row = StoredRecord {
            record_id: RecordId::new(),
            received_at: Utc::now(),
            checksum: body_checksum(&body),
            body,
        };
        let mut line = serde_json::to_string(&row)
            .map_err(|e| StoreError::serialization(format!("record for '{}'", id), e))?;
        line.push('\n');

        let path = self.path_for(id);
        let _append = guard(&self.append_lock);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| StoreError::io(&path, e))?;
        file.sync_all().map_err(|e| StoreError::io(&path, e))?;
        Ok(row.record_id)
    }

    fn scan(&self, id: &str) -> StoreResult<Vec<Record>> {
        let path = self.path_for(id);
        self.read_lines(id)?
            .into_iter()
            .map(|row| {
                Record::from_json(&row.body).map_err(|e| {
                    StoreError::corruption(&path, format!("record {}: {}", row.record_id, e))
                })
            })
            .collect()
    }

    fn count(&self, id: &str) -> StoreResult<u64> {
        Ok(self.read_lines(id)?.len() as u64)
    }
}

pub struct FileAnalysisStore {
    dir: PathBuf,
}

impl FileAnalysisStore {
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let dir = data_dir.join(ANALYSIS_DIR);
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("analysis_{}.json", id))
    }
}

impl AnalysisStore for FileAnalysisStore {
    fn get(&self, id: &str) -> StoreResult<Option<AnalysisRecord>> {
        let path = self.path_for(id);
        let Some(bytes) = read_optional(&path)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::corruption(&path, e.to_string()))
    }

    fn put(&self, analysis: &AnalysisRecord) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(analysis)
            .map_err(|e| StoreError::serialization(format!("analysis '{}'", analysis.id), e))?;
        write_atomic(&self.path_for(&analysis.id), &bytes)
    }
}
