//! Record value model
//!
//! A record is an ordered mapping from field name to `Value`. `Value` is
//! a closed union: one variant per primitive type tag plus `Object` for
//! nested records. There is no null and no array.

use indexmap::IndexMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::decode::{decode_record, encode_record};
use super::errors::RecordResult;
use crate::schema::{TypeResolver, TypeTag};

/// A decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int32(i32),
    Int16(i16),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Byte(u8),
    SByte(i8),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    Bool(bool),
    Char(char),
    Object(Record),
}

impl Value {
    /// Returns the type tag of this value
    pub fn type_tag(&self) -> TypeTag {
        TypeResolver::resolve(self)
    }

    /// Numeric projection used by statistics. `None` for non-numeric
    /// values and for decimals outside the f64 range.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(n) => Some(f64::from(*n)),
            Value::Int16(n) => Some(f64::from(*n)),
            Value::Int64(n) => Some(*n as f64),
            Value::UInt16(n) => Some(f64::from(*n)),
            Value::UInt32(n) => Some(f64::from(*n)),
            Value::UInt64(n) => Some(*n as f64),
            Value::Byte(n) => Some(f64::from(*n)),
            Value::SByte(n) => Some(f64::from(*n)),
            Value::Float32(n) => Some(f64::from(*n)),
            Value::Float64(n) => Some(*n),
            Value::Decimal(d) => d.to_f64(),
            Value::String(_) | Value::Bool(_) | Value::Char(_) | Value::Object(_) => None,
        }
    }

    /// Nested record, if this is an object
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Object(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int64(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float64(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Object(r)
    }
}

/// Ordered field-name to value mapping. Field order is the order the
/// caller supplied and survives storage round trips.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decode a JSON object into a record.
    ///
    /// # Errors
    ///
    /// `RecordError` when the input is not an object, or when any field
    /// holds a null, an array, or a malformed typed literal.
    pub fn from_json(raw: &serde_json::Value) -> RecordResult<Self> {
        decode_record(raw, "")
    }

    /// Encode back to JSON such that `from_json` yields an equal record
    pub fn to_json(&self) -> serde_json::Value {
        encode_record(self)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Record::from_json(&raw).map_err(serde::de::Error::custom)
    }
}
