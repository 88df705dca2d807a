//! Statistics engine
//!
//! Two strategies over the same tree shape:
//! - `update` folds one accepted record into running state (Welford).
//!   This is what the service persists.
//! - `recompute` scans a full record set with the two-pass formula.
//!   It is the reference definition and the repair path.
//!
//! Both skip absent values, so a record missing a nested object leaves
//! the counts under that object untouched. Both fail with `StatsError`
//! before returning anything when a value contradicts its declared type
//! or a leaf's mean or variance leaves the finite f64 range.

use super::errors::{StatsError, StatsResult};
use super::running::RunningStats;
use super::tree::{StatisticsNode, StatisticsTree};
use crate::record::{Record, Value};
use crate::schema::{join_path, SchemaTree, TypeResolver, TypeTag};

pub struct StatisticsEngine;

impl StatisticsEngine {
    /// Zeroed tree mirroring `schema`.
    pub fn initialize(schema: &SchemaTree) -> StatisticsTree {
        StatisticsTree::from_schema(schema)
    }

    /// Returns `tree` with `record` folded in. `tree` itself is never
    /// modified, so a failure leaves the caller's state intact.
    pub fn update(tree: &StatisticsTree, record: &Record) -> StatsResult<StatisticsTree> {
        let mut next = tree.clone();
        fold_level(&mut next, record, "")?;
        Ok(next)
    }

    /// Folds every record in order.
    pub fn update_all<'a, I>(tree: &StatisticsTree, records: I) -> StatsResult<StatisticsTree>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut next = tree.clone();
        for record in records {
            fold_level(&mut next, record, "")?;
        }
        Ok(next)
    }

    /// Batch strategy: population mean and standard deviation of every
    /// numeric leaf, computed from scratch over `records`.
    pub fn recompute(schema: &SchemaTree, records: &[Record]) -> StatsResult<StatisticsTree> {
        let refs: Vec<&Record> = records.iter().collect();
        let mut tree = StatisticsTree::from_schema(schema);
        recompute_level(&mut tree, &refs, "")?;
        Ok(tree)
    }
}

fn fold_level(tree: &mut StatisticsTree, record: &Record, prefix: &str) -> StatsResult<()> {
    for node in tree.nodes_mut() {
        let Some(value) = record.get(node.name()) else {
            continue;
        };
        let path = join_path(prefix, node.name());
        match node {
            StatisticsNode::Numeric {
                type_tag, stats, ..
            } => {
                stats.push(project(value, *type_tag, &path)?);
                finite(stats, &path)?;
            }
            StatisticsNode::Nested { children, .. } => {
                fold_level(children, nested(value, &path)?, &path)?;
            }
            StatisticsNode::Opaque { .. } => {}
        }
    }
    Ok(())
}

fn recompute_level(tree: &mut StatisticsTree, records: &[&Record], prefix: &str) -> StatsResult<()> {
    for node in tree.nodes_mut() {
        let name = node.name().to_string();
        let path = join_path(prefix, &name);
        let present = records.iter().filter_map(|r| r.get(&name));
        match node {
            StatisticsNode::Numeric {
                type_tag, stats, ..
            } => {
                let values = present
                    .map(|v| project(v, *type_tag, &path))
                    .collect::<StatsResult<Vec<f64>>>()?;
                *stats = RunningStats::from_values(&values);
                finite(stats, &path)?;
            }
            StatisticsNode::Nested { children, .. } => {
                let inner = present
                    .map(|v| nested(v, &path))
                    .collect::<StatsResult<Vec<&Record>>>()?;
                recompute_level(children, &inner, &path)?;
            }
            StatisticsNode::Opaque { .. } => {}
        }
    }
    Ok(())
}

fn project(value: &Value, declared: TypeTag, path: &str) -> StatsResult<f64> {
    let actual = TypeResolver::resolve(value);
    if actual != declared {
        return Err(StatsError::TypeMismatch {
            path: path.to_string(),
            expected: declared,
            actual,
        });
    }
    value.as_f64().ok_or_else(|| StatsError::NotNumeric {
        path: path.to_string(),
        type_tag: declared,
    })
}

fn finite(stats: &RunningStats, path: &str) -> StatsResult<()> {
    if stats.is_finite() {
        Ok(())
    } else {
        Err(StatsError::Overflow {
            path: path.to_string(),
        })
    }
}

fn nested<'a>(value: &'a Value, path: &str) -> StatsResult<&'a Record> {
    value.as_record().ok_or_else(|| StatsError::TypeMismatch {
        path: path.to_string(),
        expected: TypeTag::NestedObject,
        actual: TypeResolver::resolve(value),
    })
}
