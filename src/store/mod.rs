//! Collaborator stores for schemas, records, and analyses
//!
//! The service never touches persistence directly. It is handed a
//! `Stores` bundle at startup:
//! - `memory`: process-local maps
//! - `file`: a data directory with checksummed, fsynced record logs
//!
//! Record insert and analysis put are separate writes. A failure
//! between them leaves a stored record that the analysis does not yet
//! reflect; `rebuild` recomputes from the record log to close that gap.

mod checksum;
mod errors;
mod file;
mod memory;
mod traits;

pub use errors::{StoreError, StoreResult};
pub use file::{FileAnalysisStore, FileRecordStore, FileSchemaStore};
pub use memory::{MemoryAnalysisStore, MemoryRecordStore, MemorySchemaStore};
pub use traits::{AnalysisStore, RecordId, RecordStore, SchemaStore, Stores};
