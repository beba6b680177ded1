use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result, SchemaError};
use crate::value::{Composite, EnumValue, Value};

/// First tag available to externally declared enums and composites.
///
/// Tags below this value are built-in value tags.
pub const CUSTOM_TYPE_START: u8 = 128;

/// Declared element type of a composite field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Any,
    Bool,
    Int,
    Double,
    String,
    Bytes,
    Int32List,
    Int64List,
    Float32List,
    Float64List,
    List,
    Map,
    Enum(u8),
    Composite(u8),
}

impl FieldType {
    /// Whether a non-null value is acceptable for this declared type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Any, _) => true,
            (FieldType::Bool, Value::Bool(_))
            | (FieldType::Int, Value::Int(_))
            | (FieldType::Double, Value::Float(_))
            | (FieldType::String, Value::String(_))
            | (FieldType::Bytes, Value::Bytes(_))
            | (FieldType::Int32List, Value::Int32List(_))
            | (FieldType::Int64List, Value::Int64List(_))
            | (FieldType::Float32List, Value::Float32List(_))
            | (FieldType::Float64List, Value::Float64List(_))
            | (FieldType::List, Value::List(_))
            | (FieldType::Map, Value::Map(_)) => true,
            (FieldType::Enum(id), Value::Enum(e)) => e.type_id == *id,
            (FieldType::Composite(id), Value::Composite(c)) => c.type_id == *id,
            _ => false,
        }
    }

    fn referenced_type(&self) -> Option<u8> {
        match self {
            FieldType::Enum(id) | FieldType::Composite(id) => Some(*id),
            _ => None,
        }
    }
}

/// One field of a composite schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub nullable: bool,
}

impl FieldSchema {
    pub fn required(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            nullable: false,
        }
    }

    pub fn nullable(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            nullable: true,
        }
    }
}

/// A composite record type. Field order is wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeSchema {
    pub name: String,
    pub type_id: u8,
    pub fields: Vec<FieldSchema>,
}

/// An enum type. Variant position is the wire ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSchema {
    pub name: String,
    pub type_id: u8,
    pub variants: Vec<String>,
}

/// Serializable form of a whole registry, as emitted by a stub generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub enums: Vec<EnumSchema>,
    #[serde(default)]
    pub composites: Vec<CompositeSchema>,
}

/// Controls registry checks applied by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// When true, non-null composite fields must match their declared type.
    pub strict_field_types: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            strict_field_types: true,
        }
    }
}

/// Resolved custom type for a tag.
#[derive(Debug, Clone, Copy)]
pub enum TypeDef<'a> {
    Enum(&'a EnumSchema),
    Composite(&'a CompositeSchema),
}

#[derive(Debug, Clone)]
enum Entry {
    Enum(EnumSchema),
    Composite(CompositeSchema),
}

impl Entry {
    fn name(&self) -> &str {
        match self {
            Entry::Enum(schema) => &schema.name,
            Entry::Composite(schema) => &schema.name,
        }
    }
}

/// Tag-keyed registry of enum and composite schemas.
///
/// Built once, then shared read-only (`Arc<TypeRegistry>`) by every codec
/// on a session.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<u8, Entry>,
    config: RegistryConfig,
}

impl TypeRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            types: HashMap::new(),
            config,
        }
    }

    /// Register an enum type.
    pub fn register_enum(&mut self, schema: EnumSchema) -> std::result::Result<(), SchemaError> {
        self.claim(schema.type_id)?;
        self.types.insert(schema.type_id, Entry::Enum(schema));
        Ok(())
    }

    /// Register a composite type.
    ///
    /// Fields may reference types registered later (including the composite
    /// itself); call [`TypeRegistry::check_references`] once all types are in.
    pub fn register_composite(
        &mut self,
        schema: CompositeSchema,
    ) -> std::result::Result<(), SchemaError> {
        self.claim(schema.type_id)?;
        self.types.insert(schema.type_id, Entry::Composite(schema));
        Ok(())
    }

    fn claim(&self, type_id: u8) -> std::result::Result<(), SchemaError> {
        if type_id < CUSTOM_TYPE_START {
            return Err(SchemaError::ReservedTypeId(type_id));
        }
        if let Some(existing) = self.types.get(&type_id) {
            return Err(SchemaError::DuplicateTypeId {
                id: type_id,
                existing: existing.name().to_string(),
            });
        }
        Ok(())
    }

    /// Verify that every enum/composite field reference resolves.
    pub fn check_references(&self) -> std::result::Result<(), SchemaError> {
        for entry in self.types.values() {
            let Entry::Composite(schema) = entry else {
                continue;
            };
            for field in &schema.fields {
                if let Some(id) = field.field_type.referenced_type() {
                    if !self.types.contains_key(&id) {
                        return Err(SchemaError::UnresolvedType {
                            owner: schema.name.clone(),
                            field: field.name.clone(),
                            id,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Build a registry from a schema document.
    pub fn from_document(
        document: SchemaDocument,
        config: RegistryConfig,
    ) -> std::result::Result<Self, SchemaError> {
        let mut registry = Self::with_config(config);
        for schema in document.enums {
            registry.register_enum(schema)?;
        }
        for schema in document.composites {
            registry.register_composite(schema)?;
        }
        registry.check_references()?;
        tracing::debug!(types = registry.types.len(), "type registry loaded");
        Ok(registry)
    }

    /// Load a registry from a JSON schema document.
    pub fn from_json(json: &str) -> std::result::Result<Self, SchemaError> {
        Self::from_json_with_config(json, RegistryConfig::default())
    }

    /// Load a registry from a JSON schema document with explicit config.
    pub fn from_json_with_config(
        json: &str,
        config: RegistryConfig,
    ) -> std::result::Result<Self, SchemaError> {
        let document: SchemaDocument = serde_json::from_str(json)?;
        Self::from_document(document, config)
    }

    /// Export the registry as a document, sorted by type id.
    pub fn to_document(&self) -> SchemaDocument {
        let mut document = SchemaDocument::default();
        for id in self.type_ids() {
            match &self.types[&id] {
                Entry::Enum(schema) => document.enums.push(schema.clone()),
                Entry::Composite(schema) => document.composites.push(schema.clone()),
            }
        }
        document
    }

    /// Resolve a custom tag.
    pub fn lookup(&self, type_id: u8) -> Option<TypeDef<'_>> {
        self.types.get(&type_id).map(|entry| match entry {
            Entry::Enum(schema) => TypeDef::Enum(schema),
            Entry::Composite(schema) => TypeDef::Composite(schema),
        })
    }

    pub fn composite(&self, type_id: u8) -> Option<&CompositeSchema> {
        match self.types.get(&type_id) {
            Some(Entry::Composite(schema)) => Some(schema),
            _ => None,
        }
    }

    pub fn enum_schema(&self, type_id: u8) -> Option<&EnumSchema> {
        match self.types.get(&type_id) {
            Some(Entry::Enum(schema)) => Some(schema),
            _ => None,
        }
    }

    /// Symbolic name of an enum member.
    pub fn enum_name(&self, value: EnumValue) -> Option<&str> {
        self.enum_schema(value.type_id)?
            .variants
            .get(value.ordinal as usize)
            .map(String::as_str)
    }

    /// Enum member for a symbolic name.
    pub fn enum_value(&self, type_id: u8, name: &str) -> Option<EnumValue> {
        let ordinal = self
            .enum_schema(type_id)?
            .variants
            .iter()
            .position(|variant| variant == name)?;
        Some(EnumValue::new(type_id, ordinal as u32))
    }

    /// Check if a custom tag is registered.
    pub fn has_type(&self, type_id: u8) -> bool {
        self.types.contains_key(&type_id)
    }

    /// Registered type ids, ascending.
    pub fn type_ids(&self) -> Vec<u8> {
        let mut ids: Vec<u8> = self.types.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub(crate) fn check_enum(&self, value: EnumValue) -> Result<()> {
        let schema = self
            .enum_schema(value.type_id)
            .ok_or(CodecError::UnknownTypeId(value.type_id))?;
        if value.ordinal as usize >= schema.variants.len() {
            return Err(CodecError::SchemaMismatch(format!(
                "ordinal {} out of range for enum '{}' ({} variants)",
                value.ordinal,
                schema.name,
                schema.variants.len()
            )));
        }
        Ok(())
    }

    /// Field-count check, done before any field is read or written.
    pub(crate) fn check_field_count(&self, type_id: u8, count: usize) -> Result<&CompositeSchema> {
        let schema = self
            .composite(type_id)
            .ok_or(CodecError::UnknownTypeId(type_id))?;
        if schema.fields.len() != count {
            return Err(CodecError::SchemaMismatch(format!(
                "composite '{}' expects {} fields, got {count}",
                schema.name,
                schema.fields.len()
            )));
        }
        Ok(schema)
    }

    pub(crate) fn check_composite(&self, composite: &Composite) -> Result<()> {
        let schema = self.check_field_count(composite.type_id, composite.fields.len())?;
        for (field, value) in schema.fields.iter().zip(&composite.fields) {
            if value.is_null() {
                if !field.nullable {
                    return Err(CodecError::SchemaMismatch(format!(
                        "null in non-nullable field '{}.{}'",
                        schema.name, field.name
                    )));
                }
                continue;
            }
            if self.config.strict_field_types && !field.field_type.accepts(value) {
                return Err(CodecError::SchemaMismatch(format!(
                    "field '{}.{}' expects {:?}, got {}",
                    schema.name,
                    field.name,
                    field.field_type,
                    value.kind()
                )));
            }
        }
        Ok(())
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "enums": [
            { "name": "Color", "type_id": 129, "variants": ["red", "green", "blue"] }
        ],
        "composites": [
            {
                "name": "Node",
                "type_id": 130,
                "fields": [
                    { "name": "label", "type": "string" },
                    { "name": "color", "type": { "enum": 129 }, "nullable": true },
                    { "name": "next", "type": { "composite": 130 }, "nullable": true }
                ]
            }
        ]
    }"#;

    #[test]
    fn from_json_loads_enums_and_composites() {
        let registry = TypeRegistry::from_json(DOCUMENT).unwrap();
        assert_eq!(registry.type_ids(), vec![129, 130]);
        assert!(matches!(registry.lookup(129), Some(TypeDef::Enum(_))));
        assert!(matches!(registry.lookup(130), Some(TypeDef::Composite(_))));
        assert!(registry.lookup(131).is_none());
    }

    #[test]
    fn document_roundtrips_through_json() {
        let registry = TypeRegistry::from_json(DOCUMENT).unwrap();
        let json = serde_json::to_string(&registry.to_document()).unwrap();
        let reloaded = TypeRegistry::from_json(&json).unwrap();
        assert_eq!(reloaded.to_document(), registry.to_document());
    }

    #[test]
    fn reserved_type_id_rejected() {
        let mut registry = TypeRegistry::new();
        let err = registry
            .register_enum(EnumSchema {
                name: "Low".to_string(),
                type_id: 12,
                variants: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, SchemaError::ReservedTypeId(12)));
    }

    #[test]
    fn duplicate_type_id_rejected() {
        let mut registry = TypeRegistry::from_json(DOCUMENT).unwrap();
        let err = registry
            .register_composite(CompositeSchema {
                name: "Other".to_string(),
                type_id: 130,
                fields: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateTypeId { id: 130, .. }));
    }

    #[test]
    fn unresolved_reference_rejected() {
        let json = r#"{
            "composites": [
                { "name": "A", "type_id": 140, "fields": [
                    { "name": "b", "type": { "composite": 141 } }
                ] }
            ]
        }"#;
        let err = TypeRegistry::from_json(json).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedType { id: 141, .. }));
    }

    #[test]
    fn invalid_json_document_rejected() {
        assert!(matches!(
            TypeRegistry::from_json("{ not json"),
            Err(SchemaError::InvalidJson(_))
        ));
    }

    #[test]
    fn enum_name_and_value_lookup() {
        let registry = TypeRegistry::from_json(DOCUMENT).unwrap();
        assert_eq!(registry.enum_name(EnumValue::new(129, 2)), Some("blue"));
        assert_eq!(registry.enum_name(EnumValue::new(129, 3)), None);
        assert_eq!(
            registry.enum_value(129, "green"),
            Some(EnumValue::new(129, 1))
        );
        assert_eq!(registry.enum_value(130, "green"), None);
    }

    #[test]
    fn composite_check_enforces_nullability_and_types() {
        let registry = TypeRegistry::from_json(DOCUMENT).unwrap();

        let ok = Composite::new(130, vec![Value::from("a"), Value::Null, Value::Null]);
        assert!(registry.check_composite(&ok).is_ok());

        let missing_label = Composite::new(130, vec![Value::Null, Value::Null, Value::Null]);
        assert!(matches!(
            registry.check_composite(&missing_label),
            Err(CodecError::SchemaMismatch(_))
        ));

        let wrong_type = Composite::new(130, vec![Value::Int(1), Value::Null, Value::Null]);
        assert!(matches!(
            registry.check_composite(&wrong_type),
            Err(CodecError::SchemaMismatch(_))
        ));

        let wrong_count = Composite::new(130, vec![Value::from("a")]);
        assert!(matches!(
            registry.check_composite(&wrong_count),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn lenient_config_skips_type_checks() {
        let registry = TypeRegistry::from_json_with_config(
            DOCUMENT,
            RegistryConfig {
                strict_field_types: false,
            },
        )
        .unwrap();
        let wrong_type = Composite::new(130, vec![Value::Int(1), Value::Null, Value::Null]);
        assert!(registry.check_composite(&wrong_type).is_ok());
    }
}
