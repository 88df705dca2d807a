//! Schema validator for records
//!
//! Counting semantics, one depth-first pass per level:
//! - A present field absent from the schema is extra. It is never walked.
//! - A present field whose resolved tag differs from the declared tag is a
//!   bad value. It is never walked, even when declared as customobject.
//! - A present, correctly typed customobject is walked and its counts are
//!   added to the totals.
//! - A declared field absent from the record is missing.
//!
//! The validator has no side effects; validating twice yields the same
//! outcome.

use std::collections::HashMap;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use super::resolver::TypeResolver;
use super::types::{join_path, FieldSpec, SchemaTree, TypeTag};
use crate::record::{Record, Value};

/// Bad/missing/extra counts summed over every nesting level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub bad_value_count: u64,
    pub missing_field_count: u64,
    pub extra_field_count: u64,
}

impl ValidationOutcome {
    pub fn new(bad_value_count: u64, missing_field_count: u64, extra_field_count: u64) -> Self {
        Self {
            bad_value_count,
            missing_field_count,
            extra_field_count,
        }
    }

    /// True when every counter is zero
    pub fn is_clean(&self) -> bool {
        self.bad_value_count == 0 && self.missing_field_count == 0 && self.extra_field_count == 0
    }
}

impl AddAssign for ValidationOutcome {
    fn add_assign(&mut self, rhs: Self) {
        self.bad_value_count += rhs.bad_value_count;
        self.missing_field_count += rhs.missing_field_count;
        self.extra_field_count += rhs.extra_field_count;
    }
}

impl Add for ValidationOutcome {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

/// Kind of a counted violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    BadValue,
    MissingField,
    ExtraField,
}

/// One counted event, with the dotted path from the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub path: String,
    pub kind: ViolationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<TypeTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<TypeTag>,
}

/// Outcome plus the violations behind each count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub outcome: ValidationOutcome,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    fn bad_value(&mut self, path: String, expected: TypeTag, actual: TypeTag) {
        self.outcome.bad_value_count += 1;
        self.violations.push(Violation {
            path,
            kind: ViolationKind::BadValue,
            expected: Some(expected),
            actual: Some(actual),
        });
    }

    fn missing_field(&mut self, path: String, expected: TypeTag) {
        self.outcome.missing_field_count += 1;
        self.violations.push(Violation {
            path,
            kind: ViolationKind::MissingField,
            expected: Some(expected),
            actual: None,
        });
    }

    fn extra_field(&mut self, path: String, actual: TypeTag) {
        self.outcome.extra_field_count += 1;
        self.violations.push(Violation {
            path,
            kind: ViolationKind::ExtraField,
            expected: None,
            actual: Some(actual),
        });
    }
}

/// Validator bound to one registered schema.
pub struct SchemaValidator<'a> {
    schema: &'a SchemaTree,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(schema: &'a SchemaTree) -> Self {
        Self { schema }
    }

    /// Counts bad, missing, and extra fields across all levels.
    pub fn validate(&self, record: &Record) -> ValidationOutcome {
        self.inspect(record).outcome
    }

    /// Like `validate`, also listing every counted violation.
    pub fn inspect(&self, record: &Record) -> ValidationReport {
        let mut report = ValidationReport::default();
        walk_level(self.schema, record, "", &mut report);
        report
    }
}

/// Validates `record` against `schema`.
pub fn validate(schema: &SchemaTree, record: &Record) -> ValidationOutcome {
    SchemaValidator::new(schema).validate(record)
}

fn walk_level(level: &SchemaTree, record: &Record, prefix: &str, report: &mut ValidationReport) {
    let lookup: HashMap<&str, &FieldSpec> = level.iter().map(|f| (f.name(), f)).collect();

    for (name, value) in record.iter() {
        let path = join_path(prefix, name);

        let Some(spec) = lookup.get(name) else {
            report.extra_field(path, TypeResolver::resolve(value));
            continue;
        };

        let actual = TypeResolver::resolve(value);
        if actual != spec.type_tag() {
            report.bad_value(path, spec.type_tag(), actual);
            continue;
        }

        if let (Some(children), Value::Object(nested)) = (spec.children(), value) {
            walk_level(children, nested, &path, report);
        }
    }

    for spec in level.iter() {
        if !record.contains_key(spec.name()) {
            report.missing_field(join_path(prefix, spec.name()), spec.type_tag());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SchemaTree {
        let office = SchemaTree::new(vec![FieldSpec::string("building"), FieldSpec::int("room")])
            .unwrap();
        let professor = SchemaTree::new(vec![
            FieldSpec::string("name"),
            FieldSpec::int("yearsAtRice"),
            FieldSpec::nested("office", office),
        ])
        .unwrap();
        SchemaTree::new(vec![
            FieldSpec::string("classroomName"),
            FieldSpec::int("classroomLimit"),
            FieldSpec::nested("professor", professor),
        ])
        .unwrap()
    }

    fn office() -> Record {
        Record::new().with("building", "Duncan").with("room", 1072)
    }

    fn professor() -> Record {
        Record::new()
            .with("name", "Swong")
            .with("yearsAtRice", 10)
            .with("office", office())
    }

    fn valid() -> Record {
        Record::new()
            .with("classroomName", "Duncan Hall 1072")
            .with("classroomLimit", 65)
            .with("professor", professor())
    }

    #[test]
    fn test_valid_record_is_clean() {
        let outcome = validate(&schema(), &valid());
        assert_eq!(outcome, ValidationOutcome::default());
        assert!(outcome.is_clean());
    }

    #[test]
    fn test_wrong_type_is_bad_not_missing() {
        let mut record = valid();
        record.insert("classroomLimit", "sixty-five");
        let report = SchemaValidator::new(&schema()).inspect(&record);
        assert_eq!(report.outcome, ValidationOutcome::new(1, 0, 0));
        assert_eq!(
            report.violations,
            vec![Violation {
                path: "classroomLimit".into(),
                kind: ViolationKind::BadValue,
                expected: Some(TypeTag::Int32),
                actual: Some(TypeTag::String),
            }]
        );
    }

    #[test]
    fn test_wrong_typed_nested_object_is_not_walked() {
        let mut record = valid();
        record.insert("professor", "Swong");
        assert_eq!(validate(&schema(), &record), ValidationOutcome::new(1, 0, 0));
    }

    #[test]
    fn test_extra_nested_looking_field_is_not_walked() {
        let mut record = valid();
        record.insert("assistant", Record::new().with("name", 42));
        assert_eq!(validate(&schema(), &record), ValidationOutcome::new(0, 0, 1));
    }

    #[test]
    fn test_missing_nested_object_counts_once() {
        let mut record = valid();
        record.remove("professor");
        assert_eq!(validate(&schema(), &record), ValidationOutcome::new(0, 1, 0));
    }

    #[test]
    fn test_counts_add_across_depths() {
        let bad_office = Record::new().with("building", 7).with("floor", 2);
        let bad_professor = Record::new()
            .with("name", "Swong")
            .with("office", bad_office);
        let record = Record::new()
            .with("classroomName", "Duncan Hall 1072")
            .with("classroomLimit", 65.5)
            .with("professor", bad_professor)
            .with("building", "Duncan");

        let report = SchemaValidator::new(&schema()).inspect(&record);
        // bad: classroomLimit, professor.office.building
        // missing: professor.yearsAtRice, professor.office.room
        // extra: professor.office.floor, building
        assert_eq!(report.outcome, ValidationOutcome::new(2, 2, 2));
        let paths: Vec<_> = report.violations.iter().map(|v| v.path.as_str()).collect();
        assert!(paths.contains(&"professor.office.building"));
        assert!(paths.contains(&"professor.office.room"));
        assert!(paths.contains(&"professor.yearsAtRice"));
    }

    #[test]
    fn test_rename_counts_extra_and_missing() {
        let mut record = valid();
        let limit = record.remove("classroomLimit").unwrap();
        record.insert("classroomCap", limit);
        assert_eq!(validate(&schema(), &record), ValidationOutcome::new(0, 1, 1));
    }

    #[test]
    fn test_empty_record_is_all_missing() {
        assert_eq!(
            validate(&schema(), &Record::new()),
            ValidationOutcome::new(0, 3, 0)
        );
    }

    #[test]
    fn test_outcome_addition() {
        let total = ValidationOutcome::new(1, 2, 3) + ValidationOutcome::new(1, 0, 1);
        assert_eq!(total, ValidationOutcome::new(2, 2, 4));
    }
}
