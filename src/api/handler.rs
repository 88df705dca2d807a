//! API handler for shapestat
//!
//! Orchestrates validation, statistics, and the three stores behind a
//! single mutex. Every operation that reads and then writes an analysis
//! record holds the lock for the whole sequence, so concurrent submits
//! never lose updates.
//!
//! Submit flow:
//! 1. Check identifier, decode record
//! 2. Load schema and analysis
//! 3. Validate
//! 4. Clean: fold statistics (incremental mode), insert record, put analysis
//! 5. Not clean: bump failure tallies, put analysis, record is not stored

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::errors::{ApiError, ApiResult};
use super::request::Request;
use super::response::Response;
use crate::observability::Event;
use crate::record::Record;
use crate::schema::{SchemaTree, SchemaValidator, ValidationOutcome, Violation};
use crate::stats::{AnalysisRecord, StatisticsEngine, StatsError};
use crate::store::{RecordId, StoreError, Stores};

/// Longest accepted schema identifier
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// How analysis statistics are kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Fold each accepted record into the persisted tree
    #[default]
    Incremental,
    /// Recompute from the record log on every fetch
    Recompute,
}

/// Result of one submit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    pub outcome: ValidationOutcome,
    pub violations: Vec<Violation>,
}

/// API handler with a global execution lock
pub struct ApiHandler {
    lock: Mutex<()>,
    stores: Stores,
    mode: AnalysisMode,
}

impl ApiHandler {
    pub fn new(stores: Stores, mode: AnalysisMode) -> Self {
        Self {
            lock: Mutex::new(()),
            stores,
            mode,
        }
    }

    /// Handler over fresh in-memory stores
    pub fn in_memory(mode: AnalysisMode) -> Self {
        Self::new(Stores::in_memory(), mode)
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    fn acquire(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `raw` under `id` and creates its zeroed analysis.
    pub fn register_schema(&self, id: &str, raw: &Value) -> ApiResult<AnalysisRecord> {
        validate_identifier(id)?;
        let schema = SchemaTree::parse(raw).map_err(|e| {
            info!(
                event = Event::SchemaRejected.as_str(),
                schema_id = id,
                code = e.code(),
                "schema rejected: {}",
                e
            );
            ApiError::from(e)
        })?;

        let _guard = self.acquire();
        self.stores
            .schemas
            .insert(id, &schema)
            .map_err(|e| store_failure(id, e))?;

        let analysis = AnalysisRecord::new(id, &schema);
        self.stores
            .analyses
            .put(&analysis)
            .map_err(|e| store_failure(id, e))?;

        info!(
            event = Event::SchemaRegistered.as_str(),
            schema_id = id,
            fields = schema.len(),
            numeric_fields = schema.numeric_paths().len(),
            "schema registered"
        );
        Ok(analysis)
    }

    pub fn get_schema(&self, id: &str) -> ApiResult<SchemaTree> {
        validate_identifier(id)?;
        let _guard = self.acquire();
        self.load_schema(id)
    }

    /// Registered schema identifiers, sorted
    pub fn schema_ids(&self) -> ApiResult<Vec<String>> {
        let _guard = self.acquire();
        self.stores.schemas.ids().map_err(|e| store_failure("*", e))
    }

    /// Validates `raw` against the schema registered as `id`; stores it
    /// and folds its statistics when clean.
    pub fn submit_record(&self, id: &str, raw: &Value) -> ApiResult<SubmitOutcome> {
        validate_identifier(id)?;
        let record = Record::from_json(raw)?;

        let _guard = self.acquire();
        let schema = self.load_schema(id)?;
        let mut analysis = self.load_analysis(id, &schema)?;

        let report = SchemaValidator::new(&schema).inspect(&record);
        if !report.outcome.is_clean() {
            analysis.record_rejection(&report.outcome);
            self.stores
                .analyses
                .put(&analysis)
                .map_err(|e| store_failure(id, e))?;
            info!(
                event = Event::RecordRejected.as_str(),
                schema_id = id,
                bad_values = report.outcome.bad_value_count,
                missing_fields = report.outcome.missing_field_count,
                extra_fields = report.outcome.extra_field_count,
                "record rejected"
            );
            return Ok(SubmitOutcome {
                accepted: false,
                record_id: None,
                outcome: report.outcome,
                violations: report.violations,
            });
        }

        // Fold before any write so an inconsistency or overflow leaves both
        // stores untouched
        let statistics = match self.mode {
            AnalysisMode::Incremental => StatisticsEngine::update(&analysis.statistics, &record)
                .map_err(|e| inconsistency(id, e))?,
            AnalysisMode::Recompute => {
                let mut records = self
                    .stores
                    .records
                    .scan(id)
                    .map_err(|e| store_failure(id, e))?;
                records.push(record.clone());
                StatisticsEngine::recompute(&schema, &records).map_err(|e| inconsistency(id, e))?
            }
        };

        let record_id = self
            .stores
            .records
            .insert(id, &record)
            .map_err(|e| store_failure(id, e))?;
        analysis.record_acceptance(statistics);
        self.stores
            .analyses
            .put(&analysis)
            .map_err(|e| store_failure(id, e))?;

        info!(
            event = Event::RecordAccepted.as_str(),
            schema_id = id,
            record_id = %record_id,
            number_of_records = analysis.number_of_records,
            "record accepted"
        );
        Ok(SubmitOutcome {
            accepted: true,
            record_id: Some(record_id),
            outcome: report.outcome,
            violations: Vec::new(),
        })
    }

    /// Current analysis. In recompute mode the statistics are derived
    /// from the record log on each call and not persisted.
    pub fn fetch_analysis(&self, id: &str) -> ApiResult<AnalysisRecord> {
        validate_identifier(id)?;
        let _guard = self.acquire();
        let schema = self.load_schema(id)?;
        let mut analysis = self.load_analysis(id, &schema)?;

        if self.mode == AnalysisMode::Recompute {
            self.rebuild_into(id, &schema, &mut analysis)?;
        }

        debug!(
            event = Event::AnalysisFetched.as_str(),
            schema_id = id,
            number_of_records = analysis.number_of_records,
            "analysis fetched"
        );
        Ok(analysis)
    }

    /// Recomputes statistics and the accepted count from the record
    /// log and persists the result. Failure tallies are kept when the
    /// stored analysis still reads back; an unreadable one is replaced.
    pub fn rebuild_analysis(&self, id: &str) -> ApiResult<AnalysisRecord> {
        validate_identifier(id)?;
        let _guard = self.acquire();
        let schema = self.load_schema(id)?;
        let mut analysis = AnalysisRecord::new(id, &schema);
        match self.stores.analyses.get(id) {
            Ok(Some(stored)) => {
                analysis.bad_value_count = stored.bad_value_count;
                analysis.missing_field_count = stored.missing_field_count;
                analysis.extra_field_count = stored.extra_field_count;
            }
            Ok(None) => {}
            Err(e) => warn!(
                event = Event::StoreFailure.as_str(),
                schema_id = id,
                code = e.code(),
                "stored analysis unreadable, rebuilding without tallies: {}",
                e
            ),
        }
        self.rebuild_into(id, &schema, &mut analysis)?;
        self.stores
            .analyses
            .put(&analysis)
            .map_err(|e| store_failure(id, e))?;

        info!(
            event = Event::AnalysisRebuilt.as_str(),
            schema_id = id,
            number_of_records = analysis.number_of_records,
            "analysis rebuilt"
        );
        Ok(analysis)
    }

    /// Handle one JSON envelope
    pub fn handle(&self, json_request: &str) -> Response {
        let request = match Request::parse(json_request) {
            Ok(r) => r,
            Err(e) => return Response::error(&e),
        };

        let result = match &request {
            Request::Register { schema_id, fields } => self
                .register_schema(schema_id, fields)
                .and_then(|a| to_data(&a)),
            Request::Submit { schema_id, record } => self
                .submit_record(schema_id, record)
                .and_then(|o| to_data(&o)),
            Request::Analysis { schema_id } => {
                self.fetch_analysis(schema_id).and_then(|a| to_data(&a))
            }
            Request::Rebuild { schema_id } => {
                self.rebuild_analysis(schema_id).and_then(|a| to_data(&a))
            }
            Request::Schema { schema_id } => self.get_schema(schema_id).map(|s| s.to_json()),
        };

        match result {
            Ok(data) => Response::success(data),
            Err(e) => Response::error(&e),
        }
    }

    fn load_schema(&self, id: &str) -> ApiResult<SchemaTree> {
        self.stores
            .schemas
            .get(id)
            .map_err(|e| store_failure(id, e))?
            .ok_or_else(|| ApiError::unknown_schema(id))
    }

    /// Stored analysis, or one rebuilt from the record log when the
    /// schema exists but its analysis write never landed.
    fn load_analysis(&self, id: &str, schema: &SchemaTree) -> ApiResult<AnalysisRecord> {
        if let Some(analysis) = self
            .stores
            .analyses
            .get(id)
            .map_err(|e| store_failure(id, e))?
        {
            return Ok(analysis);
        }
        warn!(
            event = Event::StoreFailure.as_str(),
            schema_id = id,
            "analysis missing for registered schema, rebuilding from records"
        );
        let mut analysis = AnalysisRecord::new(id, schema);
        self.rebuild_into(id, schema, &mut analysis)?;
        Ok(analysis)
    }

    fn rebuild_into(
        &self,
        id: &str,
        schema: &SchemaTree,
        analysis: &mut AnalysisRecord,
    ) -> ApiResult<()> {
        let records = self
            .stores
            .records
            .scan(id)
            .map_err(|e| store_failure(id, e))?;
        analysis.statistics =
            StatisticsEngine::recompute(schema, &records).map_err(|e| inconsistency(id, e))?;
        analysis.number_of_records = records.len() as u64;
        Ok(())
    }
}

/// 1..=128 chars of `[A-Za-z0-9_.-]`, not starting with `.`
pub fn validate_identifier(id: &str) -> ApiResult<()> {
    if id.is_empty() || id.len() > MAX_IDENTIFIER_LEN {
        return Err(ApiError::invalid_input(format!(
            "schema identifier must be 1 to {} characters",
            MAX_IDENTIFIER_LEN
        )));
    }
    if id.starts_with('.') {
        return Err(ApiError::invalid_input("schema identifier must not start with '.'"));
    }
    if let Some(c) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
    {
        return Err(ApiError::invalid_input(format!(
            "schema identifier contains invalid character {:?}",
            c
        )));
    }
    Ok(())
}

fn to_data<T: Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize response: {}", e)))
}

fn store_failure(id: &str, err: StoreError) -> ApiError {
    if !matches!(err, StoreError::AlreadyExists { .. }) {
        warn!(
            event = Event::StoreFailure.as_str(),
            schema_id = id,
            code = err.code(),
            "store operation failed: {}",
            err
        );
    }
    ApiError::from(err)
}

fn inconsistency(id: &str, err: StatsError) -> ApiError {
    if err.is_defect() {
        error!(
            event = Event::InternalInconsistency.as_str(),
            schema_id = id,
            path = err.path(),
            "statistics disagree with validation: {}",
            err
        );
    } else {
        info!(
            event = Event::RecordRejected.as_str(),
            schema_id = id,
            path = err.path(),
            code = err.code(),
            "record rejected: {}",
            err
        );
    }
    ApiError::from(err)
}
