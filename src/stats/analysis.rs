//! Per-schema analysis record
//!
//! Created zeroed at registration, then mutated once per submitted
//! record. Rejections bump each failure kind by at most one, so the
//! counters count records, not violations.

use serde::{Deserialize, Serialize};

use super::tree::StatisticsTree;
use crate::schema::{SchemaTree, ValidationOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    /// Accepted records only
    pub number_of_records: u64,
    pub bad_value_count: u64,
    pub missing_field_count: u64,
    pub extra_field_count: u64,
    pub statistics: StatisticsTree,
}

impl AnalysisRecord {
    pub fn new(id: impl Into<String>, schema: &SchemaTree) -> Self {
        Self {
            id: id.into(),
            number_of_records: 0,
            bad_value_count: 0,
            missing_field_count: 0,
            extra_field_count: 0,
            statistics: StatisticsTree::from_schema(schema),
        }
    }

    /// Tally a rejected record: +1 per failure kind present.
    pub fn record_rejection(&mut self, outcome: &ValidationOutcome) {
        if outcome.bad_value_count > 0 {
            self.bad_value_count += 1;
        }
        if outcome.missing_field_count > 0 {
            self.missing_field_count += 1;
        }
        if outcome.extra_field_count > 0 {
            self.extra_field_count += 1;
        }
    }

    /// Tally an accepted record whose statistics are already folded in.
    pub fn record_acceptance(&mut self, statistics: StatisticsTree) {
        self.number_of_records += 1;
        self.statistics = statistics;
    }
}
