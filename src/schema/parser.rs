//! Raw field-shape description parser
//!
//! Wire format: an ordered array of `{ "name": string, "type": string }`
//! entries. A `customobject` entry must also carry `field_attributes`,
//! an array of the same shape. No other entry may carry it.
//!
//! Recursion depth is bounded only by the input, which is acyclic text.

use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult};
use super::types::{join_path, FieldSpec, SchemaTree, TypeTag};

const NAME_KEY: &str = "name";
const TYPE_KEY: &str = "type";
const NESTED_KEY: &str = "field_attributes";

/// Parses a raw field-shape description into a `SchemaTree`.
pub fn parse(raw: &Value) -> SchemaResult<SchemaTree> {
    parse_level(raw, "")
}

/// Parses one field list; `prefix` is the dotted path of the owner.
fn parse_level(raw: &Value, prefix: &str) -> SchemaResult<SchemaTree> {
    let entries = raw.as_array().ok_or_else(|| SchemaError::NotAnArray {
        path: display_path(prefix),
    })?;

    let mut fields = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let obj = entry.as_object().ok_or_else(|| SchemaError::EntryNotObject {
            path: display_path(prefix),
            index,
        })?;
        fields.push(parse_entry(obj, index, prefix)?);
    }

    SchemaTree::at_path(fields, prefix)
}

fn parse_entry(obj: &Map<String, Value>, index: usize, prefix: &str) -> SchemaResult<FieldSpec> {
    let name = obj
        .get(NAME_KEY)
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| SchemaError::MissingName {
            path: display_path(prefix),
            index,
        })?;
    let path = join_path(prefix, name);

    let type_name = obj
        .get(TYPE_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| SchemaError::MissingType {
            field: path.clone(),
        })?;
    let type_tag = TypeTag::from_name(type_name).ok_or_else(|| SchemaError::UnknownType {
        field: path.clone(),
        type_name: type_name.to_string(),
    })?;

    // An explicit null counts as absent
    let nested = obj.get(NESTED_KEY).filter(|v| !v.is_null());

    match (type_tag.is_nested(), nested) {
        (true, Some(raw_children)) => {
            let children = parse_level(raw_children, &path)?;
            Ok(FieldSpec::nested(name, children))
        }
        (true, None) => Err(SchemaError::MissingNestedFields { field: path }),
        (false, Some(_)) => Err(SchemaError::UnexpectedNestedFields {
            field: path,
            type_tag,
        }),
        (false, None) => Ok(FieldSpec::leaf(name, type_tag)),
    }
}

fn display_path(prefix: &str) -> String {
    if prefix.is_empty() {
        "$root".to_string()
    } else {
        prefix.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classroom_raw() -> Value {
        json!([
            {"name": "classroomName", "type": "string"},
            {"name": "classroomLimit", "type": "int"},
            {"name": "professor", "type": "customobject", "field_attributes": [
                {"name": "name", "type": "string"},
                {"name": "yearsAtRice", "type": "int"}
            ]}
        ])
    }

    #[test]
    fn test_parse_nested_schema() {
        let schema = parse(&classroom_raw()).unwrap();
        assert_eq!(schema.len(), 3);
        let professor = schema.get("professor").unwrap();
        assert_eq!(professor.type_tag(), TypeTag::NestedObject);
        let children = professor.children().unwrap();
        assert_eq!(children.fields()[1].name(), "yearsAtRice");
        assert_eq!(children.fields()[1].type_tag(), TypeTag::Int32);
    }

    #[test]
    fn test_parse_preserves_order() {
        let schema = parse(&classroom_raw()).unwrap();
        let names: Vec<_> = schema.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["classroomName", "classroomLimit", "professor"]);
    }

    #[test]
    fn test_round_trip_through_wire_format() {
        let schema = parse(&classroom_raw()).unwrap();
        assert_eq!(parse(&schema.to_json()).unwrap(), schema);
    }

    #[test]
    fn test_root_must_be_array() {
        let err = parse(&json!({"name": "x"})).unwrap_err();
        assert_eq!(err, SchemaError::NotAnArray { path: "$root".into() });
    }

    #[test]
    fn test_entry_must_be_object() {
        let err = parse(&json!(["name"])).unwrap_err();
        assert!(matches!(err, SchemaError::EntryNotObject { index: 0, .. }));
    }

    #[test]
    fn test_missing_name() {
        let err = parse(&json!([{"type": "int"}])).unwrap_err();
        assert!(matches!(err, SchemaError::MissingName { index: 0, .. }));

        let err = parse(&json!([{"name": "", "type": "int"}])).unwrap_err();
        assert!(matches!(err, SchemaError::MissingName { .. }));
    }

    #[test]
    fn test_missing_type() {
        let err = parse(&json!([{"name": "limit"}])).unwrap_err();
        assert_eq!(err, SchemaError::MissingType { field: "limit".into() });
    }

    #[test]
    fn test_unknown_type() {
        let err = parse(&json!([{"name": "when", "type": "datetime"}])).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownType {
                field: "when".into(),
                type_name: "datetime".into()
            }
        );
    }

    #[test]
    fn test_customobject_requires_field_attributes() {
        let err = parse(&json!([{"name": "professor", "type": "customobject"}])).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingNestedFields {
                field: "professor".into()
            }
        );
    }

    #[test]
    fn test_leaf_rejects_field_attributes() {
        let raw = json!([{"name": "limit", "type": "int", "field_attributes": []}]);
        let err = parse(&raw).unwrap_err();
        assert!(matches!(err, SchemaError::UnexpectedNestedFields { .. }));
    }

    #[test]
    fn test_nested_errors_carry_full_path() {
        let raw = json!([
            {"name": "professor", "type": "customobject", "field_attributes": [
                {"name": "office", "type": "customobject", "field_attributes": [
                    {"name": "room", "type": "roomnumber"}
                ]}
            ]}
        ]);
        let err = parse(&raw).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownType {
                field: "professor.office.room".into(),
                type_name: "roomnumber".into()
            }
        );
    }

    #[test]
    fn test_nested_duplicate_names() {
        let raw = json!([
            {"name": "professor", "type": "customobject", "field_attributes": [
                {"name": "name", "type": "string"},
                {"name": "name", "type": "string"}
            ]}
        ]);
        let err = parse(&raw).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateField {
                field: "professor.name".into()
            }
        );
    }

    #[test]
    fn test_empty_nested_list_allowed() {
        let raw = json!([{"name": "meta", "type": "customobject", "field_attributes": []}]);
        let schema = parse(&raw).unwrap();
        assert!(schema.get("meta").unwrap().children().unwrap().is_empty());
    }
}
