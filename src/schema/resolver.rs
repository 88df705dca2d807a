//! Maps a decoded value to its type tag.
//!
//! The value union is closed, so resolution is a total match: a new
//! value variant without a tag fails to compile instead of failing at
//! runtime.

use super::types::TypeTag;
use crate::record::Value;

pub struct TypeResolver;

impl TypeResolver {
    pub fn resolve(value: &Value) -> TypeTag {
        match value {
            Value::String(_) => TypeTag::String,
            Value::Int32(_) => TypeTag::Int32,
            Value::Int16(_) => TypeTag::Int16,
            Value::Int64(_) => TypeTag::Int64,
            Value::UInt16(_) => TypeTag::UInt16,
            Value::UInt32(_) => TypeTag::UInt32,
            Value::UInt64(_) => TypeTag::UInt64,
            Value::Byte(_) => TypeTag::Byte,
            Value::SByte(_) => TypeTag::SByte,
            Value::Float32(_) => TypeTag::Float32,
            Value::Float64(_) => TypeTag::Float64,
            Value::Decimal(_) => TypeTag::Decimal,
            Value::Bool(_) => TypeTag::Bool,
            Value::Char(_) => TypeTag::Char,
            Value::Object(_) => TypeTag::NestedObject,
        }
    }
}
