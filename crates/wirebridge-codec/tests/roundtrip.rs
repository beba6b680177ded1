use std::sync::Arc;

use bytes::Bytes;
use wirebridge_codec::{
    Codec, CodecError, Composite, CompositeSchema, EnumSchema, EnumValue, FieldSchema, FieldType,
    TypeRegistry, Value,
};

const SETTINGS: u8 = 140;
const LEVEL: u8 = 141;
const TREE: u8 = 142;

fn codec() -> Codec {
    let mut registry = TypeRegistry::new();
    registry
        .register_enum(EnumSchema {
            name: "Level".to_string(),
            type_id: LEVEL,
            variants: vec!["low".to_string(), "mid".to_string(), "high".to_string()],
        })
        .unwrap();
    registry
        .register_composite(CompositeSchema {
            name: "Settings".to_string(),
            type_id: SETTINGS,
            fields: vec![
                FieldSchema::required("id", FieldType::Int),
                FieldSchema::nullable("name", FieldType::String),
                FieldSchema::nullable("level", FieldType::Enum(LEVEL)),
                FieldSchema::nullable("ratio", FieldType::Double),
                FieldSchema::nullable("blob", FieldType::Bytes),
                FieldSchema::nullable("tags", FieldType::List),
            ],
        })
        .unwrap();
    registry
        .register_composite(CompositeSchema {
            name: "Tree".to_string(),
            type_id: TREE,
            fields: vec![
                FieldSchema::required("value", FieldType::Int),
                FieldSchema::nullable("child", FieldType::Composite(TREE)),
            ],
        })
        .unwrap();
    registry.check_references().unwrap();
    Codec::new(Arc::new(registry))
}

fn samples() -> Vec<Value> {
    vec![
        Value::Null,
        Value::Bool(true),
        Value::Int(0),
        Value::Int(-123_456),
        Value::Int(i64::MAX),
        Value::Float(-0.25),
        Value::Float(f64::MAX),
        Value::from(""),
        Value::from("héllo wörld"),
        Value::Bytes(Bytes::from_static(&[0, 1, 2, 255])),
        Value::Int32List(vec![1, -2, i32::MAX]),
        Value::Int64List(vec![i64::MIN, 0]),
        Value::Float32List(vec![1.5, -2.25]),
        Value::Float64List(vec![3.5, 1e300]),
        Value::List(vec![
            Value::Int(1),
            Value::from("two"),
            Value::List(vec![Value::Null, Value::Float(3.0)]),
        ]),
        Value::Map(vec![
            (Value::from("a"), Value::Int(1)),
            (Value::Int(2), Value::List(vec![Value::Bool(false)])),
            (Value::Null, Value::Map(vec![])),
        ]),
        Value::Enum(EnumValue::new(LEVEL, 2)),
        Value::Composite(Composite::new(
            SETTINGS,
            vec![
                Value::Int(7),
                Value::from("seven"),
                Value::Enum(EnumValue::new(LEVEL, 0)),
                Value::Float(0.5),
                Value::Bytes(Bytes::from_static(b"xyz")),
                Value::List(vec![Value::from("t")]),
            ],
        )),
    ]
}

#[test]
fn every_sample_roundtrips() {
    let codec = codec();
    for value in samples() {
        let wire = codec.encode(&value).unwrap();
        assert_eq!(codec.decode(&wire).unwrap(), value, "value {value:?}");
    }
}

#[test]
fn all_samples_in_one_list_roundtrip() {
    let codec = codec();
    let value = Value::List(samples());
    let wire = codec.encode(&value).unwrap();
    assert_eq!(codec.decode(&wire).unwrap(), value);
}

#[test]
fn composite_with_null_optionals_keeps_required_field() {
    let codec = codec();
    let value = Value::Composite(Composite::new(
        SETTINGS,
        vec![
            Value::Int(42),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
        ],
    ));
    let decoded = codec.decode(&codec.encode(&value).unwrap()).unwrap();
    let Value::Composite(composite) = &decoded else {
        panic!("expected composite, got {decoded:?}");
    };
    assert_eq!(composite.field(0), &Value::Int(42));
    assert!(composite.fields[1..].iter().all(Value::is_null));
    assert_eq!(decoded, value);
}

#[test]
fn truncated_prefix_is_always_malformed() {
    let codec = codec();
    for value in samples().into_iter().chain([Value::List(samples())]) {
        let wire = codec.encode(&value).unwrap();
        for cut in 0..wire.len() {
            match codec.decode(&wire[..cut]) {
                Err(CodecError::MalformedPayload(_)) => {}
                other => panic!("prefix {cut}/{} of {value:?} gave {other:?}", wire.len()),
            }
        }
    }
}

#[test]
fn unknown_composite_id_never_partially_decodes() {
    let codec = codec();
    let wire = codec.encode(&Value::List(vec![Value::Int(1)])).unwrap();
    let mut forged = vec![200u8];
    forged.extend_from_slice(&wire);
    assert_eq!(codec.decode(&forged), Err(CodecError::UnknownTypeId(200)));

    let nested = [12u8, 2, 0, 201, 12, 0];
    assert_eq!(codec.decode(&nested), Err(CodecError::UnknownTypeId(201)));
}

#[test]
fn encoding_unregistered_composite_fails() {
    let codec = codec();
    let value = Value::Composite(Composite::new(199, vec![]));
    assert_eq!(codec.encode(&value), Err(CodecError::UnknownTypeId(199)));
}

#[test]
fn recursive_composite_chain_roundtrips() {
    let codec = codec();
    let mut tree = Value::Null;
    for depth in 0..4096 {
        tree = Value::Composite(Composite::new(TREE, vec![Value::Int(depth), tree]));
    }
    let wire = codec.encode(&tree).unwrap();
    assert_eq!(codec.decode(&wire).unwrap(), tree);
}

#[test]
fn deeply_nested_lists_roundtrip() {
    let codec = codec();
    let mut value = Value::Int(1);
    for _ in 0..4096 {
        value = Value::List(vec![value]);
    }
    let wire = codec.encode(&value).unwrap();
    assert_eq!(codec.decode(&wire).unwrap(), value);
}

#[test]
fn million_level_wire_nesting_decodes_and_drops() {
    let codec = codec();
    let mut wire: Vec<u8> = [12u8, 1].repeat(1_000_000);
    wire.push(0);

    let value = codec.decode(&wire).unwrap();
    assert_eq!(value.depth(), 1_000_000);
    let copy = value.clone();
    assert_eq!(copy, value);
    drop(copy);
    drop(value);
}

#[test]
fn deep_nested_maps_and_lists_roundtrip() {
    let codec = codec();
    let mut value = Value::Null;
    for depth in 0..500_000 {
        value = if depth % 2 == 0 {
            Value::Map(vec![(Value::Int(depth), value)])
        } else {
            Value::List(vec![Value::Int(depth), value])
        };
    }
    let wire = codec.encode(&value).unwrap();
    assert_eq!(codec.decode(&wire).unwrap(), value);
}

#[test]
fn deep_composite_chain_roundtrips() {
    let codec = codec();
    let mut tree = Value::Null;
    for depth in 0..500_000 {
        tree = Value::Composite(Composite::new(TREE, vec![Value::Int(depth), tree]));
    }
    let wire = codec.encode(&tree).unwrap();
    assert_eq!(codec.decode(&wire).unwrap(), tree);
}

#[test]
fn large_collections_use_wide_size_prefixes() {
    let codec = codec();
    let value = Value::List((0..70_000).map(Value::Int).collect());
    let wire = codec.encode(&value).unwrap();
    assert_eq!(wire[1], 255);
    assert_eq!(codec.decode(&wire).unwrap(), value);
}
