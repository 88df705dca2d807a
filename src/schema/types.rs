//! Schema type definitions
//!
//! Supported types:
//! - string, char, bool
//! - int, short, long, ushort, uint, ulong, byte, sbyte (integers)
//! - float, double, decimal (fractional)
//! - customobject: nested object with its own ordered field list
//!
//! Type names on the wire are matched case-insensitively and always
//! serialized in canonical form.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::errors::{SchemaError, SchemaResult};

/// Canonical type tags. `NestedObject` is the only recursive case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeTag {
    String,
    Int32,
    Int16,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Byte,
    SByte,
    Float32,
    Float64,
    Decimal,
    Bool,
    Char,
    NestedObject,
}

impl TypeTag {
    /// Every tag, in declaration order.
    pub const ALL: [TypeTag; 15] = [
        TypeTag::String,
        TypeTag::Int32,
        TypeTag::Int16,
        TypeTag::Int64,
        TypeTag::UInt16,
        TypeTag::UInt32,
        TypeTag::UInt64,
        TypeTag::Byte,
        TypeTag::SByte,
        TypeTag::Float32,
        TypeTag::Float64,
        TypeTag::Decimal,
        TypeTag::Bool,
        TypeTag::Char,
        TypeTag::NestedObject,
    ];

    /// Returns the canonical wire name
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Int32 => "int",
            TypeTag::Int16 => "short",
            TypeTag::Int64 => "long",
            TypeTag::UInt16 => "ushort",
            TypeTag::UInt32 => "uint",
            TypeTag::UInt64 => "ulong",
            TypeTag::Byte => "byte",
            TypeTag::SByte => "sbyte",
            TypeTag::Float32 => "float",
            TypeTag::Float64 => "double",
            TypeTag::Decimal => "decimal",
            TypeTag::Bool => "bool",
            TypeTag::Char => "char",
            TypeTag::NestedObject => "customobject",
        }
    }

    /// Looks up a tag by wire name. Case-insensitive; accepts the
    /// width-suffixed aliases (`int32`, `uint64`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        let tag = match lowered.as_str() {
            "string" => TypeTag::String,
            "int" | "int32" => TypeTag::Int32,
            "short" | "int16" => TypeTag::Int16,
            "long" | "int64" => TypeTag::Int64,
            "ushort" | "uint16" => TypeTag::UInt16,
            "uint" | "uint32" => TypeTag::UInt32,
            "ulong" | "uint64" => TypeTag::UInt64,
            "byte" => TypeTag::Byte,
            "sbyte" => TypeTag::SByte,
            "float" | "single" => TypeTag::Float32,
            "double" => TypeTag::Float64,
            "decimal" => TypeTag::Decimal,
            "bool" | "boolean" => TypeTag::Bool,
            "char" => TypeTag::Char,
            "customobject" => TypeTag::NestedObject,
            _ => return None,
        };
        Some(tag)
    }

    /// Whether values of this type feed running statistics
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeTag::Int32
                | TypeTag::Int16
                | TypeTag::Int64
                | TypeTag::UInt16
                | TypeTag::UInt32
                | TypeTag::UInt64
                | TypeTag::Byte
                | TypeTag::SByte
                | TypeTag::Float32
                | TypeTag::Float64
                | TypeTag::Decimal
        )
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, TypeTag::NestedObject)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl TryFrom<String> for TypeTag {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        TypeTag::from_name(&name).ok_or_else(|| format!("unknown type name '{}'", name))
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.type_name().to_string()
    }
}

/// One named, typed field. `children` is present iff the type is
/// `NestedObject`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    name: String,
    #[serde(rename = "type")]
    type_tag: TypeTag,
    #[serde(rename = "field_attributes", skip_serializing_if = "Option::is_none")]
    children: Option<SchemaTree>,
}

impl FieldSpec {
    /// Create a leaf field. A `NestedObject` tag yields a nested field
    /// with no children.
    pub fn leaf(name: impl Into<String>, type_tag: TypeTag) -> Self {
        if type_tag.is_nested() {
            return Self::nested(name, SchemaTree::default());
        }
        Self {
            name: name.into(),
            type_tag,
            children: None,
        }
    }

    /// Create a nested object field
    pub fn nested(name: impl Into<String>, children: SchemaTree) -> Self {
        Self {
            name: name.into(),
            type_tag: TypeTag::NestedObject,
            children: Some(children),
        }
    }

    /// Create a string field
    pub fn string(name: impl Into<String>) -> Self {
        Self::leaf(name, TypeTag::String)
    }

    /// Create an int (32-bit) field
    pub fn int(name: impl Into<String>) -> Self {
        Self::leaf(name, TypeTag::Int32)
    }

    /// Create a double field
    pub fn double(name: impl Into<String>) -> Self {
        Self::leaf(name, TypeTag::Float64)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Nested field list, `Some` only for `NestedObject` fields
    pub fn children(&self) -> Option<&SchemaTree> {
        self.children.as_ref()
    }
}

/// Ordered field list at one nesting level. Names are unique per level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SchemaTree {
    fields: Vec<FieldSpec>,
}

impl SchemaTree {
    /// Build a level from field specs, rejecting duplicate names.
    pub fn new(fields: Vec<FieldSpec>) -> SchemaResult<Self> {
        Self::at_path(fields, "")
    }

    /// Same as `new`, reporting duplicates relative to `prefix`.
    pub(crate) fn at_path(fields: Vec<FieldSpec>, prefix: &str) -> SchemaResult<Self> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    field: join_path(prefix, &field.name),
                });
            }
        }
        Ok(Self { fields })
    }

    /// Parse the raw wire description (ordered array of
    /// `{name, type, field_attributes?}`).
    pub fn parse(raw: &serde_json::Value) -> SchemaResult<Self> {
        super::parser::parse(raw)
    }

    /// Serialize back to the wire description
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field by name at this level
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Dotted paths of every numeric leaf, depth-first in field order.
    pub fn numeric_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_numeric_paths("", &mut paths);
        paths
    }

    fn collect_numeric_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for field in &self.fields {
            let path = join_path(prefix, &field.name);
            match &field.children {
                Some(children) => children.collect_numeric_paths(&path, out),
                None if field.type_tag.is_numeric() => out.push(path),
                None => {}
            }
        }
    }
}

impl<'de> Deserialize<'de> for SchemaTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        SchemaTree::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Joins a dotted field path. An empty prefix is the root.
pub fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classroom() -> SchemaTree {
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
    fn test_type_names_round_trip() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::from_name(tag.type_name()), Some(tag));
        }
    }

    #[test]
    fn test_type_name_case_and_aliases() {
        assert_eq!(TypeTag::from_name("CustomObject"), Some(TypeTag::NestedObject));
        assert_eq!(TypeTag::from_name("Int64"), Some(TypeTag::Int64));
        assert_eq!(TypeTag::from_name("Boolean"), Some(TypeTag::Bool));
        assert_eq!(TypeTag::from_name("datetime"), None);
    }

    #[test]
    fn test_numeric_classification() {
        assert!(TypeTag::Decimal.is_numeric());
        assert!(TypeTag::Byte.is_numeric());
        assert!(!TypeTag::Char.is_numeric());
        assert!(!TypeTag::Bool.is_numeric());
        assert!(!TypeTag::NestedObject.is_numeric());
    }

    #[test]
    fn test_leaf_with_nested_tag_gets_children() {
        let field = FieldSpec::leaf("inner", TypeTag::NestedObject);
        assert!(field.children().is_some());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = SchemaTree::new(vec![FieldSpec::string("a"), FieldSpec::int("a")]);
        assert_eq!(
            result.unwrap_err(),
            SchemaError::DuplicateField { field: "a".into() }
        );
    }

    #[test]
    fn test_numeric_paths_skip_nested_levels() {
        assert_eq!(
            classroom().numeric_paths(),
            vec!["classroomLimit".to_string(), "professor.yearsAtRice".to_string()]
        );
    }

    #[test]
    fn test_serializes_to_wire_format() {
        let json = classroom().to_json();
        assert_eq!(json[1]["type"], "int");
        assert_eq!(json[2]["type"], "customobject");
        assert_eq!(json[2]["field_attributes"][1]["name"], "yearsAtRice");
        assert!(json[0].get("field_attributes").is_none());
    }

    #[test]
    fn test_get_by_name() {
        let schema = classroom();
        assert_eq!(schema.get("classroomLimit").unwrap().type_tag(), TypeTag::Int32);
        assert!(schema.get("building").is_none());
    }
}
