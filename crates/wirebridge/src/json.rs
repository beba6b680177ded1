//! JSON conversions for CLI argument input and result output.

use serde_json::{Map as JsonMap, Number, Value as Json};
use wirebridge::codec::{TypeDef, TypeRegistry, Value};

/// Convert parsed JSON into a codec value.
///
/// Integral numbers become `Int`, other numbers `Float`; objects become
/// maps with string keys, ordered by key.
pub fn from_json(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::String(s),
        Json::Array(items) => Value::List(items.into_iter().map(from_json).collect()),
        Json::Object(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Value::String(k), from_json(v)))
                .collect(),
        ),
    }
}

/// Deepest value [`to_json`] renders, matching serde_json's own parse limit.
pub const MAX_RENDER_DEPTH: usize = 128;

/// Reject values too deeply nested to render as JSON.
pub fn check_render_depth(value: &Value) -> Result<(), String> {
    let depth = value.depth();
    if depth > MAX_RENDER_DEPTH {
        return Err(format!(
            "value is nested {depth} levels deep; at most {MAX_RENDER_DEPTH} can be rendered"
        ));
    }
    Ok(())
}

/// Render a codec value as JSON. Callers bound the depth first with
/// [`check_render_depth`].
///
/// Enums render as `"Type.variant"` and composites as objects keyed by
/// field name when the registry knows them. Maps with non-string keys
/// render as a list of `[key, value]` pairs.
pub fn to_json(value: &Value, registry: &TypeRegistry) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => float(*f),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::Array(b.iter().map(|byte| Json::from(*byte)).collect()),
        Value::Int32List(items) => Json::Array(items.iter().map(|i| Json::from(*i)).collect()),
        Value::Int64List(items) => Json::Array(items.iter().map(|i| Json::from(*i)).collect()),
        Value::Float32List(items) => {
            Json::Array(items.iter().map(|f| float(f64::from(*f))).collect())
        }
        Value::Float64List(items) => Json::Array(items.iter().map(|f| float(*f)).collect()),
        Value::List(items) => Json::Array(items.iter().map(|v| to_json(v, registry)).collect()),
        Value::Map(entries) => {
            if entries.iter().all(|(k, _)| k.as_str().is_some()) {
                let mut object = JsonMap::new();
                for (k, v) in entries {
                    object.insert(k.as_str().unwrap_or_default().to_string(), to_json(v, registry));
                }
                Json::Object(object)
            } else {
                Json::Array(
                    entries
                        .iter()
                        .map(|(k, v)| Json::Array(vec![to_json(k, registry), to_json(v, registry)]))
                        .collect(),
                )
            }
        }
        Value::Enum(e) => match (registry.enum_schema(e.type_id), registry.enum_name(*e)) {
            (Some(schema), Some(name)) => Json::String(format!("{}.{name}", schema.name)),
            _ => Json::from(e.ordinal),
        },
        Value::Composite(c) => match registry.lookup(c.type_id) {
            Some(TypeDef::Composite(schema)) => {
                let mut object = JsonMap::new();
                for (field, value) in schema.fields.iter().zip(&c.fields) {
                    object.insert(field.name.clone(), to_json(value, registry));
                }
                Json::Object(object)
            }
            _ => Json::Array(c.fields.iter().map(|v| to_json(v, registry)).collect()),
        },
    }
}

fn float(f: f64) -> Json {
    Number::from_f64(f).map_or(Json::Null, Json::Number)
}

/// Parse a JSON array of call arguments.
pub fn parse_args(input: &str) -> Result<Vec<Value>, String> {
    match serde_json::from_str::<Json>(input) {
        Ok(Json::Array(items)) => Ok(items.into_iter().map(from_json).collect()),
        Ok(other) => Err(format!("--args must be a JSON array, got {other}")),
        Err(err) => Err(format!("--args is not valid JSON: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirebridge::codec::{Composite, EnumValue};
    use wirebridge::integration::{registry, ALL_CLASSES_WRAPPER_TYPE_ID, AN_ENUM_TYPE_ID};

    #[test]
    fn parses_argument_arrays() {
        let args = parse_args(r#"[123, 1.5, "s", null, [true], {"k": 1}]"#).unwrap();
        assert_eq!(
            args,
            vec![
                Value::Int(123),
                Value::Float(1.5),
                Value::from("s"),
                Value::Null,
                Value::List(vec![Value::Bool(true)]),
                Value::Map(vec![(Value::from("k"), Value::Int(1))]),
            ]
        );
    }

    #[test]
    fn rejects_non_array_arguments() {
        assert!(parse_args("{}").unwrap_err().contains("JSON array"));
        assert!(parse_args("[").unwrap_err().contains("not valid JSON"));
    }

    #[test]
    fn renders_named_enums_and_composites() {
        let registry = registry().unwrap();
        let enum_value = Value::Enum(EnumValue::new(AN_ENUM_TYPE_ID, 3));
        assert_eq!(to_json(&enum_value, &registry), Json::from("AnEnum.fortyTwo"));

        let wrapper = Value::Composite(Composite::new(
            ALL_CLASSES_WRAPPER_TYPE_ID,
            vec![Value::Int(1), Value::Null, Value::from("t")],
        ));
        let json = to_json(&wrapper, &registry);
        assert_eq!(json["allNullableTypes"], Json::from(1));
        assert_eq!(json["allNullableTypesWithoutRecursion"], Json::Null);
        assert_eq!(json["allTypes"], Json::from("t"));
    }

    #[test]
    fn non_string_keys_render_as_pairs() {
        let map = Value::Map(vec![(Value::Int(1), Value::from("one"))]);
        assert_eq!(
            to_json(&map, &TypeRegistry::new()),
            serde_json::json!([[1, "one"]])
        );
    }

    #[test]
    fn render_depth_is_bounded() {
        let mut value = Value::Int(0);
        for _ in 0..MAX_RENDER_DEPTH {
            value = Value::List(vec![value]);
        }
        assert!(check_render_depth(&value).is_ok());
        let deeper = Value::List(vec![value]);
        assert!(check_render_depth(&deeper).unwrap_err().contains("129 levels"));
    }
}
