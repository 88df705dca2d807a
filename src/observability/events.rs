//! Observable events for shapestat
//!
//! Every log line carries one of these as its `event` field, so logs
//! can be filtered on a closed vocabulary instead of message text.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    ConfigLoaded,
    StoresOpened,
    ServerStart,
    StdinLoopStart,
    Shutdown,

    // Schemas
    SchemaRegistered,
    SchemaRejected,

    // Records
    RecordAccepted,
    RecordRejected,

    // Analyses
    AnalysisFetched,
    AnalysisRebuilt,

    // Failures
    StoreFailure,
    /// A value contradicted an earlier validation pass
    InternalInconsistency,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoresOpened => "STORES_OPENED",
            Event::ServerStart => "SERVER_START",
            Event::StdinLoopStart => "STDIN_LOOP_START",
            Event::Shutdown => "SHUTDOWN",
            Event::SchemaRegistered => "SCHEMA_REGISTERED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::RecordAccepted => "RECORD_ACCEPTED",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::AnalysisFetched => "ANALYSIS_FETCHED",
            Event::AnalysisRebuilt => "ANALYSIS_REBUILT",
            Event::StoreFailure => "STORE_FAILURE",
            Event::InternalInconsistency => "INTERNAL_INCONSISTENCY",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
