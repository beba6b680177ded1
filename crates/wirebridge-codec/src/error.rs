/// Errors that can occur while encoding or decoding values.
///
/// Every failure is reported as a value; the codec never panics on input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The bytes are truncated, carry an unknown built-in tag, or are
    /// otherwise not a valid encoding.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A custom tag (>= 128) that no registered enum or composite claims.
    #[error("unknown type id {0}")]
    UnknownTypeId(u8),

    /// A composite or enum disagrees with its registered schema.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
}

impl CodecError {
    pub(crate) fn truncated(needed: usize, offset: usize, len: usize) -> Self {
        CodecError::MalformedPayload(format!(
            "truncated input: need {needed} bytes at offset {offset}, have {}",
            len.saturating_sub(offset)
        ))
    }
}

/// Errors that can occur while building a type registry.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Type ids below the custom range collide with built-in tags.
    #[error("type id {0} is reserved for built-in tags (custom ids start at 128)")]
    ReservedTypeId(u8),

    /// Two types were registered with the same id.
    #[error("type id {id} already registered as '{existing}'")]
    DuplicateTypeId { id: u8, existing: String },

    /// A field references an enum or composite id that is not registered.
    #[error("field '{field}' of '{owner}' references unregistered type id {id}")]
    UnresolvedType { owner: String, field: String, id: u8 },

    /// The schema document is not valid JSON for the registry format.
    #[error("invalid schema document: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
