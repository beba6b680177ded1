//! Tagged binary value codec for cross-runtime calls.
//!
//! Every value starts with a one-byte tag. Built-in tags cover null,
//! booleans, integers, doubles, strings, byte buffers, typed numeric
//! arrays, lists and maps; tags from 128 up name enums and composites
//! declared in a [`TypeRegistry`].
//!
//! Requests and replies are ordinary values with a fixed list shape; see
//! [`envelope`].

pub mod codec;
pub mod convert;
pub mod envelope;
pub mod error;
pub mod schema;
pub mod value;

pub use codec::{decode_value, encode_value, Codec};
pub use convert::{FromValue, IntoValue};
pub use envelope::{codes, ErrorRecord, Reply, Request};
pub use error::{CodecError, Result, SchemaError};
pub use schema::{
    CompositeSchema, EnumSchema, FieldSchema, FieldType, RegistryConfig, SchemaDocument, TypeDef,
    TypeRegistry, CUSTOM_TYPE_START,
};
pub use value::{Composite, EnumValue, Value};
