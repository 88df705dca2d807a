//! Schema-shaped statistics tree
//!
//! One node per schema field, in schema order:
//! - numeric leaves carry running count/mean/variance state
//! - customobject fields carry a child tree
//! - string, bool, and char leaves carry only their name and type
//!
//! Serialized form per node: `name`, `type`, then `count`, `mean`,
//! `standard_deviation`, `sum_of_squares` for numeric leaves or
//! `children` for nested objects.

use serde::{Deserialize, Serialize};

use super::running::RunningStats;
use crate::schema::{SchemaTree, TypeTag};

/// One field's statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "NodeWire", try_from = "NodeWire")]
pub enum StatisticsNode {
    Numeric {
        name: String,
        type_tag: TypeTag,
        stats: RunningStats,
    },
    Nested {
        name: String,
        children: StatisticsTree,
    },
    Opaque {
        name: String,
        type_tag: TypeTag,
    },
}

impl StatisticsNode {
    pub fn name(&self) -> &str {
        match self {
            StatisticsNode::Numeric { name, .. }
            | StatisticsNode::Nested { name, .. }
            | StatisticsNode::Opaque { name, .. } => name,
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            StatisticsNode::Numeric { type_tag, .. } | StatisticsNode::Opaque { type_tag, .. } => {
                *type_tag
            }
            StatisticsNode::Nested { .. } => TypeTag::NestedObject,
        }
    }

    /// Running statistics of a numeric leaf
    pub fn stats(&self) -> Option<&RunningStats> {
        match self {
            StatisticsNode::Numeric { stats, .. } => Some(stats),
            _ => None,
        }
    }

    /// Child tree of a nested node
    pub fn children(&self) -> Option<&StatisticsTree> {
        match self {
            StatisticsNode::Nested { children, .. } => Some(children),
            _ => None,
        }
    }
}

/// Ordered statistics nodes, isomorphic to the schema they came from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatisticsTree {
    nodes: Vec<StatisticsNode>,
}

impl StatisticsTree {
    /// Zeroed tree mirroring `schema`
    pub fn from_schema(schema: &SchemaTree) -> Self {
        let nodes = schema
            .iter()
            .map(|field| match field.children() {
                Some(children) => StatisticsNode::Nested {
                    name: field.name().to_string(),
                    children: StatisticsTree::from_schema(children),
                },
                None if field.type_tag().is_numeric() => StatisticsNode::Numeric {
                    name: field.name().to_string(),
                    type_tag: field.type_tag(),
                    stats: RunningStats::new(),
                },
                None => StatisticsNode::Opaque {
                    name: field.name().to_string(),
                    type_tag: field.type_tag(),
                },
            })
            .collect();
        Self { nodes }
    }

    pub fn nodes(&self) -> &[StatisticsNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [StatisticsNode] {
        &mut self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatisticsNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at this level by name
    pub fn get(&self, name: &str) -> Option<&StatisticsNode> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    /// Node at a dotted path, e.g. `professor.yearsAtRice`
    pub fn find(&self, path: &str) -> Option<&StatisticsNode> {
        let mut segments = path.split('.');
        let mut node = self.get(segments.next()?)?;
        for segment in segments {
            node = node.children()?.get(segment)?;
        }
        Some(node)
    }

    /// Same shape, and every numeric leaf agrees within `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.nodes.len() == other.nodes.len()
            && self
                .nodes
                .iter()
                .zip(&other.nodes)
                .all(|(a, b)| node_approx_eq(a, b, tolerance))
    }
}

fn node_approx_eq(a: &StatisticsNode, b: &StatisticsNode, tolerance: f64) -> bool {
    if a.name() != b.name() || a.type_tag() != b.type_tag() {
        return false;
    }
    match (a, b) {
        (
            StatisticsNode::Numeric { stats: left, .. },
            StatisticsNode::Numeric { stats: right, .. },
        ) => left.approx_eq(right, tolerance),
        (
            StatisticsNode::Nested { children: left, .. },
            StatisticsNode::Nested { children: right, .. },
        ) => left.approx_eq(right, tolerance),
        (StatisticsNode::Opaque { .. }, StatisticsNode::Opaque { .. }) => true,
        _ => false,
    }
}

/// Flat serialized shape shared by all node kinds
#[derive(Serialize, Deserialize)]
struct NodeWire {
    name: String,
    #[serde(rename = "type")]
    type_tag: TypeTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    standard_deviation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sum_of_squares: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<StatisticsTree>,
}

impl From<StatisticsNode> for NodeWire {
    fn from(node: StatisticsNode) -> Self {
        match node {
            StatisticsNode::Numeric {
                name,
                type_tag,
                stats,
            } => NodeWire {
                name,
                type_tag,
                count: Some(stats.count()),
                mean: Some(stats.mean()),
                standard_deviation: Some(stats.std_dev()),
                sum_of_squares: Some(stats.sum_of_squares()),
                children: None,
            },
            StatisticsNode::Nested { name, children } => NodeWire {
                name,
                type_tag: TypeTag::NestedObject,
                count: None,
                mean: None,
                standard_deviation: None,
                sum_of_squares: None,
                children: Some(children),
            },
            StatisticsNode::Opaque { name, type_tag } => NodeWire {
                name,
                type_tag,
                count: None,
                mean: None,
                standard_deviation: None,
                sum_of_squares: None,
                children: None,
            },
        }
    }
}

impl TryFrom<NodeWire> for StatisticsNode {
    type Error = String;

    fn try_from(wire: NodeWire) -> Result<Self, Self::Error> {
        if wire.type_tag.is_nested() {
            let children = wire
                .children
                .ok_or_else(|| format!("nested node '{}' has no children", wire.name))?;
            return Ok(StatisticsNode::Nested {
                name: wire.name,
                children,
            });
        }

        if wire.type_tag.is_numeric() {
            // standard_deviation is derived and not read back
            return match (wire.count, wire.mean, wire.sum_of_squares) {
                (Some(count), Some(mean), Some(m2)) => Ok(StatisticsNode::Numeric {
                    name: wire.name,
                    type_tag: wire.type_tag,
                    stats: RunningStats::from_parts(count, mean, m2),
                }),
                _ => Err(format!(
                    "numeric node '{}' needs count, mean and sum_of_squares",
                    wire.name
                )),
            };
        }

        Ok(StatisticsNode::Opaque {
            name: wire.name,
            type_tag: wire.type_tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use serde_json::json;

    fn schema() -> SchemaTree {
        let professor = SchemaTree::new(vec![
            FieldSpec::string("name"),
            FieldSpec::int("yearsAtRice"),
        ])
        .unwrap();
        SchemaTree::new(vec![
            FieldSpec::string("classroomName"),
            FieldSpec::int("classroomLimit"),
            FieldSpec::nested("professor", professor),
        ])
        .unwrap()
    }

    #[test]
    fn test_mirrors_schema_shape() {
        let tree = StatisticsTree::from_schema(&schema());
        assert_eq!(tree.len(), 3);
        assert!(matches!(tree.nodes()[0], StatisticsNode::Opaque { .. }));
        assert_eq!(tree.find("classroomLimit").unwrap().stats().unwrap().count(), 0);
        let nested = tree.find("professor").unwrap().children().unwrap();
        assert_eq!(nested.nodes()[1].name(), "yearsAtRice");
        assert!(tree.find("professor.yearsAtRice").unwrap().stats().is_some());
        assert!(tree.find("professor.missing").is_none());
        assert!(tree.find("classroomLimit.deeper").is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let tree = StatisticsTree::from_schema(&schema());
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json[0], json!({"name": "classroomName", "type": "string"}));
        assert_eq!(
            json[1],
            json!({
                "name": "classroomLimit",
                "type": "int",
                "count": 0,
                "mean": 0.0,
                "standard_deviation": 0.0,
                "sum_of_squares": 0.0
            })
        );
        assert_eq!(json[2]["type"], "customobject");
        assert_eq!(json[2]["children"][1]["name"], "yearsAtRice");
    }

    #[test]
    fn test_deserialize_round_trip() {
        let mut tree = StatisticsTree::from_schema(&schema());
        if let StatisticsNode::Numeric { stats, .. } = &mut tree.nodes_mut()[1] {
            stats.push(65.0);
            stats.push(35.0);
        }
        let text = serde_json::to_string(&tree).unwrap();
        let back: StatisticsTree = serde_json::from_str(&text).unwrap();
        assert_eq!(back, tree);
        assert_eq!(back.find("classroomLimit").unwrap().stats().unwrap().std_dev(), 15.0);
    }

    #[test]
    fn test_numeric_node_requires_state() {
        let raw = json!([{"name": "limit", "type": "int", "mean": 1.0}]);
        assert!(serde_json::from_value::<StatisticsTree>(raw).is_err());
    }

    #[test]
    fn test_approx_eq_checks_shape() {
        let a = StatisticsTree::from_schema(&schema());
        let b = StatisticsTree::from_schema(
            &SchemaTree::new(vec![FieldSpec::string("classroomName")]).unwrap(),
        );
        assert!(a.approx_eq(&a.clone(), 1e-9));
        assert!(!a.approx_eq(&b, 1e-9));
    }
}
