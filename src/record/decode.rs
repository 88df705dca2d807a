//! JSON codec for records
//!
//! Decoding rules:
//! - string -> String, bool -> Bool
//! - integer -> Int32 if it fits, else Int64, else UInt64
//! - non-integer number -> Float64
//! - `{"$<type name>": payload}` -> typed literal of exactly that tag
//! - any other object -> nested record
//! - null and arrays are rejected
//!
//! Encoding writes a value plainly when plain decoding yields the same
//! variant, and as a typed literal otherwise.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{json, Map, Number, Value as Json};

use super::errors::{RecordError, RecordResult};
use super::value::{Record, Value};
use crate::schema::{join_path, TypeTag};

/// Key prefix marking a typed literal
pub const LITERAL_PREFIX: char = '$';

pub(super) fn decode_record(raw: &Json, prefix: &str) -> RecordResult<Record> {
    let obj = raw.as_object().ok_or(RecordError::NotAnObject {
        actual: json_type_name(raw),
    })?;
    decode_object(obj, prefix)
}

fn decode_object(obj: &Map<String, Json>, prefix: &str) -> RecordResult<Record> {
    obj.iter()
        .map(|(name, raw)| {
            let path = join_path(prefix, name);
            decode_value(raw, &path).map(|value| (name.clone(), value))
        })
        .collect()
}

fn decode_value(raw: &Json, path: &str) -> RecordResult<Value> {
    match raw {
        Json::Null => Err(RecordError::NullValue {
            path: path.to_string(),
        }),
        Json::Array(_) => Err(RecordError::ArrayValue {
            path: path.to_string(),
        }),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Number(n) => Ok(decode_number(n)),
        Json::Object(obj) => match typed_literal(obj) {
            Some((tag, payload)) => {
                decode_literal(tag, payload).map_err(|reason| RecordError::InvalidLiteral {
                    path: path.to_string(),
                    type_tag: tag,
                    reason,
                })
            }
            None => decode_object(obj, path).map(Value::Object),
        },
    }
}

fn decode_number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        match i32::try_from(i) {
            Ok(small) => Value::Int32(small),
            Err(_) => Value::Int64(i),
        }
    } else if let Some(u) = n.as_u64() {
        Value::UInt64(u)
    } else {
        Value::Float64(n.as_f64().unwrap_or_default())
    }
}

/// Recognizes `{"$<tag>": payload}`. Nested objects have no literal form,
/// so `$customobject` stays an ordinary nested record.
fn typed_literal(obj: &Map<String, Json>) -> Option<(TypeTag, &Json)> {
    if obj.len() != 1 {
        return None;
    }
    let (key, payload) = obj.iter().next()?;
    let tag = TypeTag::from_name(key.strip_prefix(LITERAL_PREFIX)?)?;
    if tag.is_nested() {
        return None;
    }
    Some((tag, payload))
}

fn decode_literal(tag: TypeTag, raw: &Json) -> Result<Value, String> {
    match tag {
        TypeTag::String => raw
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| expected("a string", raw)),
        TypeTag::Int32 => integer_literal(raw).map(Value::Int32),
        TypeTag::Int16 => integer_literal(raw).map(Value::Int16),
        TypeTag::Int64 => integer_literal(raw).map(Value::Int64),
        TypeTag::UInt16 => integer_literal(raw).map(Value::UInt16),
        TypeTag::UInt32 => integer_literal(raw).map(Value::UInt32),
        TypeTag::UInt64 => integer_literal(raw).map(Value::UInt64),
        TypeTag::Byte => integer_literal(raw).map(Value::Byte),
        TypeTag::SByte => integer_literal(raw).map(Value::SByte),
        TypeTag::Float32 => float_literal(raw).and_then(narrow_f32).map(Value::Float32),
        TypeTag::Float64 => float_literal(raw).map(Value::Float64),
        TypeTag::Decimal => decimal_literal(raw).map(Value::Decimal),
        TypeTag::Bool => raw
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| expected("a bool", raw)),
        TypeTag::Char => char_literal(raw).map(Value::Char),
        TypeTag::NestedObject => Err("customobject has no literal form".to_string()),
    }
}

/// Integers may arrive as JSON numbers or decimal strings.
fn integer_literal<T: TryFrom<i128>>(raw: &Json) -> Result<T, String> {
    let wide: i128 = match raw {
        Json::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .ok_or_else(|| format!("{} is not an integer", n))?,
        Json::String(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|_| format!("'{}' is not an integer", s))?,
        other => return Err(expected("an integer", other)),
    };
    T::try_from(wide).map_err(|_| format!("{} is out of range", wide))
}

fn float_literal(raw: &Json) -> Result<f64, String> {
    let value = match raw {
        Json::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("{} is not representable", n))?,
        Json::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", s))?,
        other => return Err(expected("a number", other)),
    };
    if !value.is_finite() {
        return Err(format!("{} is not finite", value));
    }
    Ok(value)
}

fn narrow_f32(value: f64) -> Result<f32, String> {
    if value.abs() > f64::from(f32::MAX) {
        return Err(format!("{} is out of range", value));
    }
    Ok(value as f32)
}

fn decimal_literal(raw: &Json) -> Result<Decimal, String> {
    let text = match raw {
        Json::Number(n) => n.to_string(),
        Json::String(s) => s.trim().to_string(),
        other => return Err(expected("a decimal", other)),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| format!("'{}' is not a decimal: {}", text, e))
}

fn char_literal(raw: &Json) -> Result<char, String> {
    let s = raw.as_str().ok_or_else(|| expected("a string", raw))?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!("expected exactly one character, got {:?}", s)),
    }
}

fn expected(what: &str, actual: &Json) -> String {
    format!("expected {}, got {}", what, json_type_name(actual))
}

pub(super) fn encode_record(record: &Record) -> Json {
    Json::Object(
        record
            .iter()
            .map(|(name, value)| (name.to_string(), encode_value(value)))
            .collect(),
    )
}

fn encode_value(value: &Value) -> Json {
    match value {
        Value::String(s) => Json::String(s.clone()),
        Value::Bool(b) => Json::Bool(*b),
        Value::Int32(n) => json!(n),
        Value::Float64(n) => json!(n),
        Value::Object(record) => encode_record(record),
        Value::Int64(n) => {
            if i32::try_from(*n).is_ok() {
                literal(TypeTag::Int64, json!(n))
            } else {
                json!(n)
            }
        }
        Value::UInt64(n) => {
            if i64::try_from(*n).is_ok() {
                literal(TypeTag::UInt64, json!(n))
            } else {
                json!(n)
            }
        }
        Value::Int16(n) => literal(TypeTag::Int16, json!(n)),
        Value::UInt16(n) => literal(TypeTag::UInt16, json!(n)),
        Value::UInt32(n) => literal(TypeTag::UInt32, json!(n)),
        Value::Byte(n) => literal(TypeTag::Byte, json!(n)),
        Value::SByte(n) => literal(TypeTag::SByte, json!(n)),
        Value::Float32(n) => literal(TypeTag::Float32, json!(f64::from(*n))),
        Value::Decimal(d) => literal(TypeTag::Decimal, Json::String(d.to_string())),
        Value::Char(c) => literal(TypeTag::Char, Json::String(c.to_string())),
    }
}

fn literal(tag: TypeTag, payload: Json) -> Json {
    let mut obj = Map::with_capacity(1);
    obj.insert(format!("{}{}", LITERAL_PREFIX, tag.type_name()), payload);
    Json::Object(obj)
}

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
