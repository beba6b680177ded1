//! Data classes of the integration-test API and their schema.

use bytes::Bytes;
use wirebridge_codec::convert::mismatch;
use wirebridge_codec::{
    CodecError, Composite, CompositeSchema, EnumSchema, EnumValue, FieldSchema, FieldType,
    FromValue, IntoValue, RegistryConfig, Result, SchemaDocument, SchemaError, TypeRegistry,
    Value,
};

pub const AN_ENUM_TYPE_ID: u8 = 129;
pub const ALL_TYPES_TYPE_ID: u8 = 130;
pub const ALL_NULLABLE_TYPES_TYPE_ID: u8 = 131;
pub const ALL_CLASSES_WRAPPER_TYPE_ID: u8 = 132;
pub const ALL_NULLABLE_TYPES_WITHOUT_RECURSION_TYPE_ID: u8 = 133;
pub const TEST_MESSAGE_TYPE_ID: u8 = 134;

/// Ordered key/value pairs with arbitrary keys, as carried by `Value::Map`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map(pub Vec<(Value, Value)>);

impl IntoValue for Map {
    fn into_value(self) -> Value {
        Value::Map(self.0)
    }
}

impl FromValue for Map {
    fn from_value(value: Value) -> Result<Self> {
        value
            .into_map()
            .map(Map)
            .map_err(|other| mismatch("map", &other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnEnum {
    One,
    Two,
    Three,
    FortyTwo,
    FourHundredTwentyTwo,
}

impl AnEnum {
    pub const VARIANTS: [&'static str; 5] =
        ["one", "two", "three", "fortyTwo", "fourHundredTwentyTwo"];

    pub fn ordinal(self) -> u32 {
        match self {
            AnEnum::One => 0,
            AnEnum::Two => 1,
            AnEnum::Three => 2,
            AnEnum::FortyTwo => 3,
            AnEnum::FourHundredTwentyTwo => 4,
        }
    }

    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        match ordinal {
            0 => Some(AnEnum::One),
            1 => Some(AnEnum::Two),
            2 => Some(AnEnum::Three),
            3 => Some(AnEnum::FortyTwo),
            4 => Some(AnEnum::FourHundredTwentyTwo),
            _ => None,
        }
    }
}

impl IntoValue for AnEnum {
    fn into_value(self) -> Value {
        Value::Enum(EnumValue::new(AN_ENUM_TYPE_ID, self.ordinal()))
    }
}

impl FromValue for AnEnum {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Enum(e) if e.type_id == AN_ENUM_TYPE_ID => AnEnum::from_ordinal(e.ordinal)
                .ok_or_else(|| {
                    CodecError::SchemaMismatch(format!("AnEnum has no ordinal {}", e.ordinal))
                }),
            other => Err(mismatch("AnEnum", &other)),
        }
    }
}

/// Every non-nullable field type.
#[derive(Debug, Clone, PartialEq)]
pub struct AllTypes {
    pub a_bool: bool,
    pub an_int: i64,
    pub an_int64: i64,
    pub a_double: f64,
    pub a_byte_array: Bytes,
    pub a_4_byte_array: Vec<i32>,
    pub a_8_byte_array: Vec<i64>,
    pub a_float_array: Vec<f64>,
    pub list: Vec<Value>,
    pub a_map: Map,
    pub an_enum: AnEnum,
    pub a_string: String,
    pub an_object: Value,
}

impl Default for AllTypes {
    fn default() -> Self {
        Self {
            a_bool: false,
            an_int: 0,
            an_int64: 0,
            a_double: 0.0,
            a_byte_array: Bytes::new(),
            a_4_byte_array: Vec::new(),
            a_8_byte_array: Vec::new(),
            a_float_array: Vec::new(),
            list: Vec::new(),
            a_map: Map::default(),
            an_enum: AnEnum::One,
            a_string: String::new(),
            an_object: Value::Int(0),
        }
    }
}

impl IntoValue for AllTypes {
    fn into_value(self) -> Value {
        Value::Composite(Composite::new(
            ALL_TYPES_TYPE_ID,
            vec![
                Value::Bool(self.a_bool),
                Value::Int(self.an_int),
                Value::Int(self.an_int64),
                Value::Float(self.a_double),
                Value::Bytes(self.a_byte_array),
                Value::Int32List(self.a_4_byte_array),
                Value::Int64List(self.a_8_byte_array),
                Value::Float64List(self.a_float_array),
                Value::List(self.list),
                self.a_map.into_value(),
                self.an_enum.into_value(),
                Value::String(self.a_string),
                self.an_object,
            ],
        ))
    }
}

impl FromValue for AllTypes {
    fn from_value(value: Value) -> Result<Self> {
        let mut fields = Fields::of(value, ALL_TYPES_TYPE_ID, "AllTypes")?;
        Ok(Self {
            a_bool: fields.next()?,
            an_int: fields.next()?,
            an_int64: fields.next()?,
            a_double: fields.next()?,
            a_byte_array: fields.next()?,
            a_4_byte_array: required(int32_list(fields.raw())?, "a4ByteArray")?,
            a_8_byte_array: required(int64_list(fields.raw())?, "a8ByteArray")?,
            a_float_array: required(float64_list(fields.raw())?, "aFloatArray")?,
            list: fields.next()?,
            a_map: fields.next()?,
            an_enum: fields.next()?,
            a_string: fields.next()?,
            an_object: fields.raw(),
        })
    }
}

/// Every field type as nullable, plus a recursive reference to itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllNullableTypes {
    pub a_nullable_bool: Option<bool>,
    pub a_nullable_int: Option<i64>,
    pub a_nullable_int64: Option<i64>,
    pub a_nullable_double: Option<f64>,
    pub a_nullable_byte_array: Option<Bytes>,
    pub a_nullable_4_byte_array: Option<Vec<i32>>,
    pub a_nullable_8_byte_array: Option<Vec<i64>>,
    pub a_nullable_float_array: Option<Vec<f64>>,
    pub a_nullable_list: Option<Vec<Value>>,
    pub a_nullable_map: Option<Map>,
    pub nullable_nested_list: Option<Vec<Value>>,
    pub nullable_map_with_annotations: Option<Map>,
    pub nullable_map_with_object: Option<Map>,
    pub a_nullable_enum: Option<AnEnum>,
    pub a_nullable_string: Option<String>,
    pub a_nullable_object: Option<Value>,
    pub all_nullable_types: Option<Box<AllNullableTypes>>,
}

impl IntoValue for AllNullableTypes {
    fn into_value(self) -> Value {
        Value::Composite(Composite::new(
            ALL_NULLABLE_TYPES_TYPE_ID,
            vec![
                self.a_nullable_bool.into_value(),
                self.a_nullable_int.into_value(),
                self.a_nullable_int64.into_value(),
                self.a_nullable_double.into_value(),
                self.a_nullable_byte_array.into_value(),
                self.a_nullable_4_byte_array
                    .map_or(Value::Null, Value::Int32List),
                self.a_nullable_8_byte_array
                    .map_or(Value::Null, Value::Int64List),
                self.a_nullable_float_array
                    .map_or(Value::Null, Value::Float64List),
                self.a_nullable_list.into_value(),
                self.a_nullable_map.into_value(),
                self.nullable_nested_list.into_value(),
                self.nullable_map_with_annotations.into_value(),
                self.nullable_map_with_object.into_value(),
                self.a_nullable_enum.into_value(),
                self.a_nullable_string.into_value(),
                self.a_nullable_object.unwrap_or(Value::Null),
                self.all_nullable_types
                    .map_or(Value::Null, |inner| (*inner).into_value()),
            ],
        ))
    }
}

impl AllNullableTypes {
    /// Deepest `allNullableTypes` chain accepted from the wire. The native
    /// struct nests through `Box`, so its drop and clone recurse.
    pub const MAX_NESTING: usize = 256;

    fn from_value_nested(value: Value, depth: usize) -> Result<Self> {
        if depth > Self::MAX_NESTING {
            return Err(CodecError::SchemaMismatch(format!(
                "AllNullableTypes nested deeper than {} levels",
                Self::MAX_NESTING
            )));
        }
        let mut fields = Fields::of(value, ALL_NULLABLE_TYPES_TYPE_ID, "AllNullableTypes")?;
        Ok(Self {
            a_nullable_bool: fields.next()?,
            a_nullable_int: fields.next()?,
            a_nullable_int64: fields.next()?,
            a_nullable_double: fields.next()?,
            a_nullable_byte_array: fields.next()?,
            a_nullable_4_byte_array: int32_list(fields.raw())?,
            a_nullable_8_byte_array: int64_list(fields.raw())?,
            a_nullable_float_array: float64_list(fields.raw())?,
            a_nullable_list: fields.next()?,
            a_nullable_map: fields.next()?,
            nullable_nested_list: fields.next()?,
            nullable_map_with_annotations: fields.next()?,
            nullable_map_with_object: fields.next()?,
            a_nullable_enum: fields.next()?,
            a_nullable_string: fields.next()?,
            a_nullable_object: Some(fields.raw()).filter(|v| !v.is_null()),
            all_nullable_types: match fields.raw() {
                inner if inner.is_null() => None,
                inner => Some(Box::new(Self::from_value_nested(inner, depth + 1)?)),
            },
        })
    }
}

impl FromValue for AllNullableTypes {
    fn from_value(value: Value) -> Result<Self> {
        Self::from_value_nested(value, 0)
    }
}

/// [`AllNullableTypes`] without the recursive field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllNullableTypesWithoutRecursion {
    pub a_nullable_bool: Option<bool>,
    pub a_nullable_int: Option<i64>,
    pub a_nullable_int64: Option<i64>,
    pub a_nullable_double: Option<f64>,
    pub a_nullable_byte_array: Option<Bytes>,
    pub a_nullable_4_byte_array: Option<Vec<i32>>,
    pub a_nullable_8_byte_array: Option<Vec<i64>>,
    pub a_nullable_float_array: Option<Vec<f64>>,
    pub a_nullable_list: Option<Vec<Value>>,
    pub a_nullable_map: Option<Map>,
    pub nullable_nested_list: Option<Vec<Value>>,
    pub nullable_map_with_annotations: Option<Map>,
    pub nullable_map_with_object: Option<Map>,
    pub a_nullable_enum: Option<AnEnum>,
    pub a_nullable_string: Option<String>,
    pub a_nullable_object: Option<Value>,
}

impl IntoValue for AllNullableTypesWithoutRecursion {
    fn into_value(self) -> Value {
        Value::Composite(Composite::new(
            ALL_NULLABLE_TYPES_WITHOUT_RECURSION_TYPE_ID,
            vec![
                self.a_nullable_bool.into_value(),
                self.a_nullable_int.into_value(),
                self.a_nullable_int64.into_value(),
                self.a_nullable_double.into_value(),
                self.a_nullable_byte_array.into_value(),
                self.a_nullable_4_byte_array
                    .map_or(Value::Null, Value::Int32List),
                self.a_nullable_8_byte_array
                    .map_or(Value::Null, Value::Int64List),
                self.a_nullable_float_array
                    .map_or(Value::Null, Value::Float64List),
                self.a_nullable_list.into_value(),
                self.a_nullable_map.into_value(),
                self.nullable_nested_list.into_value(),
                self.nullable_map_with_annotations.into_value(),
                self.nullable_map_with_object.into_value(),
                self.a_nullable_enum.into_value(),
                self.a_nullable_string.into_value(),
                self.a_nullable_object.unwrap_or(Value::Null),
            ],
        ))
    }
}

impl FromValue for AllNullableTypesWithoutRecursion {
    fn from_value(value: Value) -> Result<Self> {
        let mut fields = Fields::of(
            value,
            ALL_NULLABLE_TYPES_WITHOUT_RECURSION_TYPE_ID,
            "AllNullableTypesWithoutRecursion",
        )?;
        Ok(Self {
            a_nullable_bool: fields.next()?,
            a_nullable_int: fields.next()?,
            a_nullable_int64: fields.next()?,
            a_nullable_double: fields.next()?,
            a_nullable_byte_array: fields.next()?,
            a_nullable_4_byte_array: int32_list(fields.raw())?,
            a_nullable_8_byte_array: int64_list(fields.raw())?,
            a_nullable_float_array: float64_list(fields.raw())?,
            a_nullable_list: fields.next()?,
            a_nullable_map: fields.next()?,
            nullable_nested_list: fields.next()?,
            nullable_map_with_annotations: fields.next()?,
            nullable_map_with_object: fields.next()?,
            a_nullable_enum: fields.next()?,
            a_nullable_string: fields.next()?,
            a_nullable_object: Some(fields.raw()).filter(|v| !v.is_null()),
        })
    }
}

/// A class holding the other classes; `all_nullable_types` is required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllClassesWrapper {
    pub all_nullable_types: AllNullableTypes,
    pub all_nullable_types_without_recursion: Option<AllNullableTypesWithoutRecursion>,
    pub all_types: Option<AllTypes>,
}

impl IntoValue for AllClassesWrapper {
    fn into_value(self) -> Value {
        Value::Composite(Composite::new(
            ALL_CLASSES_WRAPPER_TYPE_ID,
            vec![
                self.all_nullable_types.into_value(),
                self.all_nullable_types_without_recursion.into_value(),
                self.all_types.into_value(),
            ],
        ))
    }
}

impl FromValue for AllClassesWrapper {
    fn from_value(value: Value) -> Result<Self> {
        let mut fields = Fields::of(value, ALL_CLASSES_WRAPPER_TYPE_ID, "AllClassesWrapper")?;
        Ok(Self {
            all_nullable_types: fields.next()?,
            all_nullable_types_without_recursion: fields.next()?,
            all_types: fields.next()?,
        })
    }
}

/// A data class wrapping a list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestMessage {
    pub test_list: Option<Vec<Value>>,
}

impl IntoValue for TestMessage {
    fn into_value(self) -> Value {
        Value::Composite(Composite::new(
            TEST_MESSAGE_TYPE_ID,
            vec![self.test_list.into_value()],
        ))
    }
}

impl FromValue for TestMessage {
    fn from_value(value: Value) -> Result<Self> {
        let mut fields = Fields::of(value, TEST_MESSAGE_TYPE_ID, "TestMessage")?;
        Ok(Self {
            test_list: fields.next()?,
        })
    }
}

/// Positional reader over a composite's fields.
struct Fields {
    iter: std::vec::IntoIter<Value>,
}

impl Fields {
    fn of(value: Value, type_id: u8, type_name: &str) -> Result<Self> {
        match value.into_composite() {
            Ok(c) if c.type_id == type_id => Ok(Self {
                iter: c.fields.into_iter(),
            }),
            Ok(c) => Err(mismatch(type_name, &Value::Composite(c))),
            Err(other) => Err(mismatch(type_name, &other)),
        }
    }

    fn raw(&mut self) -> Value {
        self.iter.next().unwrap_or(Value::Null)
    }

    fn next<T: FromValue>(&mut self) -> Result<T> {
        T::from_value(self.raw())
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| CodecError::SchemaMismatch(format!("required field '{field}' is null")))
}

fn int32_list(value: Value) -> Result<Option<Vec<i32>>> {
    match value.into_int32_list() {
        Ok(items) => Ok(Some(items)),
        Err(Value::Null) => Ok(None),
        Err(other) => Err(mismatch("int32-list", &other)),
    }
}

fn int64_list(value: Value) -> Result<Option<Vec<i64>>> {
    match value.into_int64_list() {
        Ok(items) => Ok(Some(items)),
        Err(Value::Null) => Ok(None),
        Err(other) => Err(mismatch("int64-list", &other)),
    }
}

fn float64_list(value: Value) -> Result<Option<Vec<f64>>> {
    match value.into_float64_list() {
        Ok(items) => Ok(Some(items)),
        Err(Value::Null) => Ok(None),
        Err(other) => Err(mismatch("float64-list", &other)),
    }
}

/// Schema of every type above, in the form a stub generator emits.
pub fn schema_document() -> SchemaDocument {
    use FieldType as T;
    let opt = FieldSchema::nullable;
    let req = FieldSchema::required;
    SchemaDocument {
        enums: vec![EnumSchema {
            name: "AnEnum".to_string(),
            type_id: AN_ENUM_TYPE_ID,
            variants: AnEnum::VARIANTS.iter().map(|v| v.to_string()).collect(),
        }],
        composites: vec![
            CompositeSchema {
                name: "AllTypes".to_string(),
                type_id: ALL_TYPES_TYPE_ID,
                fields: vec![
                    req("aBool", T::Bool),
                    req("anInt", T::Int),
                    req("anInt64", T::Int),
                    req("aDouble", T::Double),
                    req("aByteArray", T::Bytes),
                    req("a4ByteArray", T::Int32List),
                    req("a8ByteArray", T::Int64List),
                    req("aFloatArray", T::Float64List),
                    req("list", T::List),
                    req("aMap", T::Map),
                    req("anEnum", T::Enum(AN_ENUM_TYPE_ID)),
                    req("aString", T::String),
                    req("anObject", T::Any),
                ],
            },
            CompositeSchema {
                name: "AllNullableTypes".to_string(),
                type_id: ALL_NULLABLE_TYPES_TYPE_ID,
                fields: vec![
                    opt("aNullableBool", T::Bool),
                    opt("aNullableInt", T::Int),
                    opt("aNullableInt64", T::Int),
                    opt("aNullableDouble", T::Double),
                    opt("aNullableByteArray", T::Bytes),
                    opt("aNullable4ByteArray", T::Int32List),
                    opt("aNullable8ByteArray", T::Int64List),
                    opt("aNullableFloatArray", T::Float64List),
                    opt("aNullableList", T::List),
                    opt("aNullableMap", T::Map),
                    opt("nullableNestedList", T::List),
                    opt("nullableMapWithAnnotations", T::Map),
                    opt("nullableMapWithObject", T::Map),
                    opt("aNullableEnum", T::Enum(AN_ENUM_TYPE_ID)),
                    opt("aNullableString", T::String),
                    opt("aNullableObject", T::Any),
                    opt("allNullableTypes", T::Composite(ALL_NULLABLE_TYPES_TYPE_ID)),
                ],
            },
            CompositeSchema {
                name: "AllClassesWrapper".to_string(),
                type_id: ALL_CLASSES_WRAPPER_TYPE_ID,
                fields: vec![
                    req("allNullableTypes", T::Composite(ALL_NULLABLE_TYPES_TYPE_ID)),
                    opt(
                        "allNullableTypesWithoutRecursion",
                        T::Composite(ALL_NULLABLE_TYPES_WITHOUT_RECURSION_TYPE_ID),
                    ),
                    opt("allTypes", T::Composite(ALL_TYPES_TYPE_ID)),
                ],
            },
            CompositeSchema {
                name: "AllNullableTypesWithoutRecursion".to_string(),
                type_id: ALL_NULLABLE_TYPES_WITHOUT_RECURSION_TYPE_ID,
                fields: vec![
                    opt("aNullableBool", T::Bool),
                    opt("aNullableInt", T::Int),
                    opt("aNullableInt64", T::Int),
                    opt("aNullableDouble", T::Double),
                    opt("aNullableByteArray", T::Bytes),
                    opt("aNullable4ByteArray", T::Int32List),
                    opt("aNullable8ByteArray", T::Int64List),
                    opt("aNullableFloatArray", T::Float64List),
                    opt("aNullableList", T::List),
                    opt("aNullableMap", T::Map),
                    opt("nullableNestedList", T::List),
                    opt("nullableMapWithAnnotations", T::Map),
                    opt("nullableMapWithObject", T::Map),
                    opt("aNullableEnum", T::Enum(AN_ENUM_TYPE_ID)),
                    opt("aNullableString", T::String),
                    opt("aNullableObject", T::Any),
                ],
            },
            CompositeSchema {
                name: "TestMessage".to_string(),
                type_id: TEST_MESSAGE_TYPE_ID,
                fields: vec![opt("testList", T::List)],
            },
        ],
    }
}

/// Registry for the integration-test types.
pub fn registry() -> std::result::Result<TypeRegistry, SchemaError> {
    TypeRegistry::from_document(schema_document(), RegistryConfig::default())
}

#[cfg(test)]
mod tests {
    use wirebridge_codec::Codec;

    use super::*;

    fn codec() -> Codec {
        Codec::new(std::sync::Arc::new(registry().unwrap()))
    }

    #[test]
    fn enum_maps_ordinals_and_rejects_others() {
        assert_eq!(
            AnEnum::from_value(AnEnum::FortyTwo.into_value()).unwrap(),
            AnEnum::FortyTwo
        );
        let bad = Value::Enum(EnumValue::new(AN_ENUM_TYPE_ID, 9));
        assert!(matches!(
            AnEnum::from_value(bad),
            Err(CodecError::SchemaMismatch(_))
        ));
        assert!(AnEnum::from_value(Value::Int(0)).is_err());
    }

    #[test]
    fn all_types_survive_the_wire() {
        let value = AllTypes {
            a_bool: true,
            an_int: 42,
            an_int64: i64::MAX,
            a_double: -0.5,
            a_byte_array: Bytes::from_static(&[1, 2, 3]),
            a_4_byte_array: vec![1, -2],
            a_8_byte_array: vec![i64::MIN],
            a_float_array: vec![2.5, 1e300],
            list: vec![Value::from("a"), Value::Null],
            a_map: Map(vec![(Value::Int(1), Value::from("one"))]),
            an_enum: AnEnum::FourHundredTwentyTwo,
            a_string: "hello".to_string(),
            an_object: Value::Bool(false),
        };
        let codec = codec();
        let bytes = codec.encode(&value.clone().into_value()).unwrap();
        let back = AllTypes::from_value(codec.decode(&bytes).unwrap()).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn nested_nullable_types_keep_nulls() {
        let value = AllNullableTypes {
            a_nullable_string: Some("inner".to_string()),
            all_nullable_types: Some(Box::new(AllNullableTypes {
                a_nullable_int: Some(-1),
                ..AllNullableTypes::default()
            })),
            ..AllNullableTypes::default()
        };
        let codec = codec();
        let bytes = codec.encode(&value.clone().into_value()).unwrap();
        let back = AllNullableTypes::from_value(codec.decode(&bytes).unwrap()).unwrap();
        assert_eq!(back, value);
        assert_eq!(back.a_nullable_bool, None);
    }

    #[test]
    fn wrapper_rejects_null_required_field() {
        let raw = Value::Composite(Composite::new(
            ALL_CLASSES_WRAPPER_TYPE_ID,
            vec![Value::Null, Value::Null, Value::Null],
        ));
        assert!(matches!(
            codec().encode(&raw),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn schema_document_round_trips_through_json() {
        let json = serde_json::to_string(&schema_document()).unwrap();
        let loaded = TypeRegistry::from_json(&json).unwrap();
        assert_eq!(loaded.to_document(), schema_document());
    }

    #[test]
    fn nesting_beyond_limit_is_schema_mismatch() {
        fn chain(levels: usize) -> Value {
            let mut value = AllNullableTypes::default().into_value();
            for _ in 0..levels {
                let mut fields = vec![Value::Null; 17];
                fields[16] = value;
                value = Value::Composite(Composite::new(ALL_NULLABLE_TYPES_TYPE_ID, fields));
            }
            value
        }

        let ok = AllNullableTypes::from_value(chain(AllNullableTypes::MAX_NESTING)).unwrap();
        assert!(ok.all_nullable_types.is_some());

        let deep = codec().encode(&chain(300_000)).unwrap();
        let decoded = codec().decode(&deep).unwrap();
        assert!(matches!(
            AllNullableTypes::from_value(decoded),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn wrapper_and_message_survive_the_wire() {
        let wrapper = AllClassesWrapper {
            all_nullable_types: AllNullableTypes {
                nullable_map_with_annotations: Some(Map(vec![(
                    Value::from("k"),
                    Value::from("v"),
                )])),
                ..AllNullableTypes::default()
            },
            all_nullable_types_without_recursion: Some(AllNullableTypesWithoutRecursion {
                a_nullable_4_byte_array: Some(vec![4, 5]),
                a_nullable_enum: Some(AnEnum::Two),
                ..AllNullableTypesWithoutRecursion::default()
            }),
            all_types: None,
        };
        let message = TestMessage {
            test_list: Some(vec![Value::Int(1), wrapper.clone().into_value()]),
        };
        let codec = codec();
        let bytes = codec.encode(&message.clone().into_value()).unwrap();
        let back = TestMessage::from_value(codec.decode(&bytes).unwrap()).unwrap();
        assert_eq!(back, message);

        let list = back.test_list.unwrap_or_default();
        let inner = AllClassesWrapper::from_value(list[1].clone()).unwrap();
        assert_eq!(inner, wrapper);
    }

    #[test]
    fn without_recursion_rejects_the_recursive_type() {
        let recursive = AllNullableTypes::default().into_value();
        assert!(matches!(
            AllNullableTypesWithoutRecursion::from_value(recursive),
            Err(CodecError::SchemaMismatch(_))
        ));
    }
}
