//! Conversions between native Rust types and [`Value`].
//!
//! Generated stubs implement these for their enums and composites; the
//! impls here cover the built-in types.

use std::collections::HashMap;
use std::hash::Hash;

use bytes::Bytes;

use crate::error::{CodecError, Result};
use crate::value::Value;

pub trait IntoValue {
    fn into_value(self) -> Value;
}

pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

/// Build the `SchemaMismatch` returned when a value has the wrong shape.
pub fn mismatch(expected: &str, found: &Value) -> CodecError {
    CodecError::SchemaMismatch(format!("expected {expected}, found {}", found.kind()))
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl FromValue for () {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(()),
            other => Err(mismatch("null", &other)),
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            other => Err(mismatch("int", &other)),
        }
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| {
            CodecError::SchemaMismatch(format!("integer {wide} does not fit in 32 bits"))
        })
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            other => Err(mismatch("double", &other)),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        value
            .into_string()
            .map_err(|other| mismatch("string", &other))
    }
}

impl IntoValue for Bytes {
    fn into_value(self) -> Value {
        Value::Bytes(self)
    }
}

impl FromValue for Bytes {
    fn from_value(value: Value) -> Result<Self> {
        value
            .into_bytes()
            .map_err(|other| mismatch("bytes", &other))
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        value
            .into_list()
            .map_err(|other| mismatch("list", &other))?
            .into_iter()
            .map(T::from_value)
            .collect()
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for HashMap<K, V> {
    fn into_value(self) -> Value {
        Value::Map(
            self.into_iter()
                .map(|(k, v)| (k.into_value(), v.into_value()))
                .collect(),
        )
    }
}

impl<K: FromValue + Eq + Hash, V: FromValue> FromValue for HashMap<K, V> {
    fn from_value(value: Value) -> Result<Self> {
        value
            .into_map()
            .map_err(|other| mismatch("map", &other))?
            .into_iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i32_rejects_out_of_range() {
        assert_eq!(i32::from_value(Value::Int(-7)).unwrap(), -7);
        assert!(matches!(
            i32::from_value(Value::Int(i64::from(i32::MAX) + 1)),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn option_maps_null() {
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<String>::from_value(Value::from("x")).unwrap(),
            Some("x".to_string())
        );
        assert!(Option::<String>::from_value(Value::Int(1)).is_err());
    }

    #[test]
    fn nested_collections() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), vec![Some(1i64), None]);
        let value = map.clone().into_value();
        assert_eq!(HashMap::<String, Vec<Option<i64>>>::from_value(value).unwrap(), map);
    }

    #[test]
    fn wrong_shape_names_both_kinds() {
        let err = bool::from_value(Value::from("yes")).unwrap_err();
        assert_eq!(
            err,
            CodecError::SchemaMismatch("expected bool, found string".to_string())
        );
    }
}
