//! Schema-shaped running statistics
//!
//! A `StatisticsTree` mirrors a registered schema. Numeric leaves hold
//! count, mean, and the running sum of squared deviations, from which
//! the population standard deviation is derived. The engine is pure:
//! it takes a tree and returns a new one.

mod analysis;
mod engine;
mod errors;
mod running;
mod tree;

pub use analysis::AnalysisRecord;
pub use engine::StatisticsEngine;
pub use errors::{StatsError, StatsResult, INTERNAL_INCONSISTENCY, STATISTICS_OVERFLOW};
pub use running::RunningStats;
pub use tree::{StatisticsNode, StatisticsTree};
