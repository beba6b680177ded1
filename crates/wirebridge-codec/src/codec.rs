use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{CodecError, Result};
use crate::schema::{TypeDef, TypeRegistry, CUSTOM_TYPE_START};
use crate::value::{Composite, EnumValue, Value};

/// Built-in value tags.
///
/// Tag 5 is left unassigned; tags 15..=127 are unassigned; 128 and above
/// belong to the [`TypeRegistry`].
pub mod tag {
    pub const NULL: u8 = 0;
    pub const TRUE: u8 = 1;
    pub const FALSE: u8 = 2;
    pub const INT32: u8 = 3;
    pub const INT64: u8 = 4;
    pub const FLOAT64: u8 = 6;
    pub const STRING: u8 = 7;
    pub const BYTES: u8 = 8;
    pub const INT32_LIST: u8 = 9;
    pub const INT64_LIST: u8 = 10;
    pub const FLOAT64_LIST: u8 = 11;
    pub const LIST: u8 = 12;
    pub const MAP: u8 = 13;
    pub const FLOAT32_LIST: u8 = 14;
}

/// Sizes below this fit in the single size byte.
const SIZE_U16_MARKER: u8 = 254;
const SIZE_U32_MARKER: u8 = 255;

/// Schema-aware value codec.
///
/// Wire format (all numbers little-endian):
/// ```text
/// value    := tag payload
/// size     := u8 (< 254) | 254 u16 | 255 u32
/// int32    := 3  pad(4) i32
/// int64    := 4  pad(8) i64
/// float64  := 6  pad(8) f64
/// string   := 7  size utf8[size]
/// list     := 12 size value[size]
/// map      := 13 size (value value)[size]
/// typed    := 9|10|11|14 size pad(elem) elem[size]
/// enum     := type_id (int32 | int64)
/// composite:= type_id list            ; list length == schema field count
/// ```
/// Padding is zero bytes up to the next multiple of the alignment,
/// measured from the first byte of the message. Non-zero padding is
/// rejected as malformed.
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<TypeRegistry>,
}

impl Codec {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Encode a value into a fresh buffer.
    pub fn encode(&self, value: &Value) -> Result<Bytes> {
        let mut dst = BytesMut::new();
        encode_value(value, &self.registry, &mut dst)?;
        Ok(dst.freeze())
    }

    /// Decode exactly one value; trailing bytes are an error.
    pub fn decode(&self, src: &[u8]) -> Result<Value> {
        decode_value(src, &self.registry)
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(Arc::new(TypeRegistry::new()))
    }
}

/// Append the encoding of `value` to `dst`.
///
/// Alignment is computed relative to `dst.len()` at entry. On error, `dst`
/// is truncated back to its original length.
pub fn encode_value(value: &Value, registry: &TypeRegistry, dst: &mut BytesMut) -> Result<()> {
    let base = dst.len();
    let result = Encoder { dst, base }.run(value, registry);
    if result.is_err() {
        dst.truncate(base);
    }
    result
}

struct Encoder<'a> {
    dst: &'a mut BytesMut,
    base: usize,
}

impl Encoder<'_> {
    fn run(&mut self, root: &Value, registry: &TypeRegistry) -> Result<()> {
        let mut stack: Vec<&Value> = vec![root];

        while let Some(value) = stack.pop() {
            match value {
                Value::Null => self.dst.put_u8(tag::NULL),
                Value::Bool(true) => self.dst.put_u8(tag::TRUE),
                Value::Bool(false) => self.dst.put_u8(tag::FALSE),
                Value::Int(i) => self.put_int(*i),
                Value::Float(f) => {
                    self.dst.put_u8(tag::FLOAT64);
                    self.pad(8);
                    self.dst.put_f64_le(*f);
                }
                Value::String(s) => {
                    self.dst.put_u8(tag::STRING);
                    self.put_size(s.len())?;
                    self.dst.put_slice(s.as_bytes());
                }
                Value::Bytes(b) => {
                    self.dst.put_u8(tag::BYTES);
                    self.put_size(b.len())?;
                    self.dst.put_slice(b);
                }
                Value::Int32List(items) => {
                    self.dst.put_u8(tag::INT32_LIST);
                    self.put_size(items.len())?;
                    self.pad(4);
                    items.iter().for_each(|n| self.dst.put_i32_le(*n));
                }
                Value::Int64List(items) => {
                    self.dst.put_u8(tag::INT64_LIST);
                    self.put_size(items.len())?;
                    self.pad(8);
                    items.iter().for_each(|n| self.dst.put_i64_le(*n));
                }
                Value::Float32List(items) => {
                    self.dst.put_u8(tag::FLOAT32_LIST);
                    self.put_size(items.len())?;
                    self.pad(4);
                    items.iter().for_each(|n| self.dst.put_f32_le(*n));
                }
                Value::Float64List(items) => {
                    self.dst.put_u8(tag::FLOAT64_LIST);
                    self.put_size(items.len())?;
                    self.pad(8);
                    items.iter().for_each(|n| self.dst.put_f64_le(*n));
                }
                Value::List(items) => {
                    self.dst.put_u8(tag::LIST);
                    self.put_size(items.len())?;
                    stack.extend(items.iter().rev());
                }
                Value::Map(entries) => {
                    self.dst.put_u8(tag::MAP);
                    self.put_size(entries.len())?;
                    for (key, value) in entries.iter().rev() {
                        stack.push(value);
                        stack.push(key);
                    }
                }
                Value::Enum(e) => {
                    registry.check_enum(*e)?;
                    self.dst.put_u8(e.type_id);
                    self.put_int(i64::from(e.ordinal));
                }
                Value::Composite(c) => {
                    registry.check_composite(c)?;
                    self.dst.put_u8(c.type_id);
                    self.dst.put_u8(tag::LIST);
                    self.put_size(c.fields.len())?;
                    stack.extend(c.fields.iter().rev());
                }
            }
        }
        Ok(())
    }

    /// Narrowest integer tag that holds `value`.
    fn put_int(&mut self, value: i64) {
        match i32::try_from(value) {
            Ok(narrow) => {
                self.dst.put_u8(tag::INT32);
                self.pad(4);
                self.dst.put_i32_le(narrow);
            }
            Err(_) => {
                self.dst.put_u8(tag::INT64);
                self.pad(8);
                self.dst.put_i64_le(value);
            }
        }
    }

    fn put_size(&mut self, size: usize) -> Result<()> {
        if size < usize::from(SIZE_U16_MARKER) {
            self.dst.put_u8(size as u8);
        } else if let Ok(size) = u16::try_from(size) {
            self.dst.put_u8(SIZE_U16_MARKER);
            self.dst.put_u16_le(size);
        } else if let Ok(size) = u32::try_from(size) {
            self.dst.put_u8(SIZE_U32_MARKER);
            self.dst.put_u32_le(size);
        } else {
            return Err(CodecError::MalformedPayload(format!(
                "length {size} exceeds the u32 size prefix"
            )));
        }
        Ok(())
    }

    fn pad(&mut self, align: usize) {
        let pad = padding(self.dst.len() - self.base, align);
        self.dst.put_bytes(0, pad);
    }
}

fn padding(offset: usize, align: usize) -> usize {
    (align - offset % align) % align
}

/// Decode exactly one value from `src`.
pub fn decode_value(src: &[u8], registry: &TypeRegistry) -> Result<Value> {
    let mut reader = Reader { buf: src, pos: 0 };
    let mut stack: Vec<Partial> = Vec::new();

    loop {
        let mut value = match read_head(&mut reader, registry)? {
            Head::Value(value) => value,
            Head::Open(partial) => {
                stack.push(partial);
                continue;
            }
        };

        // Fold the finished value into its parents until one is still open.
        loop {
            let Some(top) = stack.last_mut() else {
                if reader.remaining() != 0 {
                    return Err(CodecError::MalformedPayload(format!(
                        "{} trailing bytes after value",
                        reader.remaining()
                    )));
                }
                return Ok(value);
            };
            match top.push(value, registry)? {
                Some(done) => {
                    stack.pop();
                    value = done;
                }
                None => break,
            }
        }
    }
}

enum Head {
    Value(Value),
    Open(Partial),
}

/// A container whose children are still being read.
enum Partial {
    List {
        items: Vec<Value>,
        remaining: usize,
    },
    Map {
        entries: Vec<(Value, Value)>,
        key: Option<Value>,
        remaining: usize,
    },
    Composite {
        type_id: u8,
        fields: Vec<Value>,
        remaining: usize,
    },
}

impl Partial {
    /// Add a child; returns the finished container once the last child lands.
    fn push(&mut self, value: Value, registry: &TypeRegistry) -> Result<Option<Value>> {
        match self {
            Partial::List { items, remaining } => {
                items.push(value);
                *remaining -= 1;
                if *remaining == 0 {
                    return Ok(Some(Value::List(std::mem::take(items))));
                }
            }
            Partial::Map {
                entries,
                key,
                remaining,
            } => match key.take() {
                None => *key = Some(value),
                Some(k) => {
                    entries.push((k, value));
                    *remaining -= 1;
                    if *remaining == 0 {
                        return Ok(Some(Value::Map(std::mem::take(entries))));
                    }
                }
            },
            Partial::Composite {
                type_id,
                fields,
                remaining,
            } => {
                fields.push(value);
                *remaining -= 1;
                if *remaining == 0 {
                    let composite = Composite::new(*type_id, std::mem::take(fields));
                    registry.check_composite(&composite)?;
                    return Ok(Some(Value::Composite(composite)));
                }
            }
        }
        Ok(None)
    }
}

fn read_head(reader: &mut Reader<'_>, registry: &TypeRegistry) -> Result<Head> {
    let tag = reader.read_u8()?;
    let value = match tag {
        tag::NULL => Value::Null,
        tag::TRUE => Value::Bool(true),
        tag::FALSE => Value::Bool(false),
        tag::INT32 | tag::INT64 => Value::Int(reader.read_int_payload(tag)?),
        tag::FLOAT64 => {
            reader.align(8)?;
            Value::Float(f64::from_le_bytes(reader.read_array()?))
        }
        tag::STRING => {
            let size = reader.read_size()?;
            let raw = reader.read_exact(size)?;
            let text = std::str::from_utf8(raw)
                .map_err(|err| CodecError::MalformedPayload(format!("invalid UTF-8: {err}")))?;
            Value::String(text.to_string())
        }
        tag::BYTES => {
            let size = reader.read_size()?;
            Value::Bytes(Bytes::copy_from_slice(reader.read_exact(size)?))
        }
        tag::INT32_LIST => {
            let raw = reader.read_typed(4)?;
            Value::Int32List(raw.chunks_exact(4).map(|c| i32::from_le_bytes(le4(c))).collect())
        }
        tag::INT64_LIST => {
            let raw = reader.read_typed(8)?;
            Value::Int64List(raw.chunks_exact(8).map(|c| i64::from_le_bytes(le8(c))).collect())
        }
        tag::FLOAT32_LIST => {
            let raw = reader.read_typed(4)?;
            Value::Float32List(raw.chunks_exact(4).map(|c| f32::from_le_bytes(le4(c))).collect())
        }
        tag::FLOAT64_LIST => {
            let raw = reader.read_typed(8)?;
            Value::Float64List(raw.chunks_exact(8).map(|c| f64::from_le_bytes(le8(c))).collect())
        }
        tag::LIST => {
            let size = reader.read_size()?;
            if size == 0 {
                return Ok(Head::Value(Value::List(Vec::new())));
            }
            reader.ensure_children(size)?;
            return Ok(Head::Open(Partial::List {
                items: Vec::with_capacity(size),
                remaining: size,
            }));
        }
        tag::MAP => {
            let size = reader.read_size()?;
            if size == 0 {
                return Ok(Head::Value(Value::Map(Vec::new())));
            }
            reader.ensure_children(size.saturating_mul(2))?;
            return Ok(Head::Open(Partial::Map {
                entries: Vec::with_capacity(size),
                key: None,
                remaining: size,
            }));
        }
        custom if custom >= CUSTOM_TYPE_START => {
            return read_custom(reader, registry, custom);
        }
        unknown => {
            return Err(CodecError::MalformedPayload(format!(
                "unknown value tag {unknown} at offset {}",
                reader.pos - 1
            )));
        }
    };
    Ok(Head::Value(value))
}

fn read_custom(reader: &mut Reader<'_>, registry: &TypeRegistry, type_id: u8) -> Result<Head> {
    match registry.lookup(type_id) {
        None => Err(CodecError::UnknownTypeId(type_id)),
        Some(TypeDef::Enum(schema)) => {
            let tag = reader.read_u8()?;
            if tag != tag::INT32 && tag != tag::INT64 {
                return Err(CodecError::SchemaMismatch(format!(
                    "enum '{}' carries tag {tag} instead of an integer ordinal",
                    schema.name
                )));
            }
            let raw = reader.read_int_payload(tag)?;
            let ordinal = u32::try_from(raw).map_err(|_| {
                CodecError::SchemaMismatch(format!(
                    "ordinal {raw} out of range for enum '{}'",
                    schema.name
                ))
            })?;
            let value = EnumValue::new(type_id, ordinal);
            registry.check_enum(value)?;
            Ok(Head::Value(Value::Enum(value)))
        }
        Some(TypeDef::Composite(schema)) => {
            let tag = reader.read_u8()?;
            if tag != tag::LIST {
                return Err(CodecError::SchemaMismatch(format!(
                    "composite '{}' carries tag {tag} instead of a field list",
                    schema.name
                )));
            }
            let count = reader.read_size()?;
            registry.check_field_count(type_id, count)?;
            if count == 0 {
                let composite = Composite::new(type_id, Vec::new());
                registry.check_composite(&composite)?;
                return Ok(Head::Value(Value::Composite(composite)));
            }
            reader.ensure_children(count)?;
            Ok(Head::Open(Partial::Composite {
                type_id,
                fields: Vec::with_capacity(count),
                remaining: count,
            }))
        }
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::truncated(n, self.pos, self.buf.len()));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_exact(1)?[0])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_exact(N)?);
        Ok(out)
    }

    fn read_size(&mut self) -> Result<usize> {
        match self.read_u8()? {
            SIZE_U16_MARKER => Ok(usize::from(u16::from_le_bytes(self.read_array()?))),
            SIZE_U32_MARKER => Ok(u32::from_le_bytes(self.read_array()?) as usize),
            small => Ok(usize::from(small)),
        }
    }

    fn read_int_payload(&mut self, tag: u8) -> Result<i64> {
        if tag == tag::INT32 {
            self.align(4)?;
            Ok(i64::from(i32::from_le_bytes(self.read_array()?)))
        } else {
            self.align(8)?;
            Ok(i64::from_le_bytes(self.read_array()?))
        }
    }

    /// Size, padding, then `size * elem` bytes of a typed array.
    fn read_typed(&mut self, elem: usize) -> Result<&'a [u8]> {
        let size = self.read_size()?;
        self.align(elem)?;
        let len = size.checked_mul(elem).ok_or_else(|| {
            CodecError::MalformedPayload(format!("typed array length {size} overflows"))
        })?;
        self.read_exact(len)
    }

    fn align(&mut self, align: usize) -> Result<()> {
        let start = self.pos;
        let pad = self.read_exact(padding(start, align))?;
        if pad.iter().any(|byte| *byte != 0) {
            return Err(CodecError::MalformedPayload(format!(
                "non-zero padding at offset {start}"
            )));
        }
        Ok(())
    }

    /// Every child takes at least one byte; reject counts the input cannot hold.
    fn ensure_children(&self, count: usize) -> Result<()> {
        if count > self.remaining() {
            return Err(CodecError::truncated(count, self.pos, self.buf.len()));
        }
        Ok(())
    }
}

fn le4(chunk: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(chunk);
    out
}

fn le8(chunk: &[u8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(chunk);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CompositeSchema, EnumSchema, FieldSchema, FieldType};

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register_enum(EnumSchema {
                name: "Mood".to_string(),
                type_id: 129,
                variants: vec!["calm".to_string(), "busy".to_string()],
            })
            .unwrap();
        registry
            .register_composite(CompositeSchema {
                name: "Pair".to_string(),
                type_id: 130,
                fields: vec![
                    FieldSchema::required("left", FieldType::Int),
                    FieldSchema::nullable("right", FieldType::Any),
                ],
            })
            .unwrap();
        registry
    }

    fn encode(value: &Value) -> Vec<u8> {
        let mut dst = BytesMut::new();
        encode_value(value, &registry(), &mut dst).unwrap();
        dst.to_vec()
    }

    #[test]
    fn scalar_wire_bytes() {
        assert_eq!(encode(&Value::Null), vec![0]);
        assert_eq!(encode(&Value::Bool(true)), vec![1]);
        assert_eq!(encode(&Value::Bool(false)), vec![2]);
        // tag, 3 bytes padding to offset 4, then the i32.
        assert_eq!(encode(&Value::Int(123)), vec![3, 0, 0, 0, 123, 0, 0, 0]);
        assert_eq!(encode(&Value::from("hi")), vec![7, 2, b'h', b'i']);
    }

    #[test]
    fn narrowest_integer_tag_is_chosen() {
        assert_eq!(encode(&Value::Int(-1))[0], tag::INT32);
        assert_eq!(encode(&Value::Int(i64::from(i32::MAX)))[0], tag::INT32);
        assert_eq!(encode(&Value::Int(i64::from(i32::MAX) + 1))[0], tag::INT64);
        assert_eq!(encode(&Value::Int(i64::MIN))[0], tag::INT64);
    }

    #[test]
    fn int64_tag_decodes_to_same_logical_int() {
        let mut wire = vec![tag::INT64, 0, 0, 0, 0, 0, 0, 0];
        wire.extend_from_slice(&5i64.to_le_bytes());
        assert_eq!(decode_value(&wire, &registry()).unwrap(), Value::Int(5));
    }

    #[test]
    fn float_is_eight_byte_aligned_inside_list() {
        let wire = encode(&Value::List(vec![Value::Float(1.5)]));
        // list tag, size, float tag, 5 bytes padding, 8 bytes payload.
        assert_eq!(wire.len(), 16);
        assert_eq!(&wire[3..8], &[0, 0, 0, 0, 0]);
        assert_eq!(&wire[8..], &1.5f64.to_le_bytes());
    }

    #[test]
    fn non_zero_padding_is_malformed() {
        let mut wire = encode(&Value::Int(7));
        assert_eq!(decode_value(&wire, &registry()).unwrap(), Value::Int(7));
        wire[2] = 0xAA;
        assert_eq!(
            decode_value(&wire, &registry()),
            Err(CodecError::MalformedPayload(
                "non-zero padding at offset 1".to_string()
            ))
        );

        let mut list = encode(&Value::List(vec![Value::Float(1.5)]));
        list[7] = 1;
        assert!(matches!(
            decode_value(&list, &registry()),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn size_prefix_widths() {
        let short = encode(&Value::from("x".repeat(253)));
        assert_eq!(short[1], 253);

        let medium = encode(&Value::from("x".repeat(254)));
        assert_eq!(medium[1], SIZE_U16_MARKER);
        assert_eq!(u16::from_le_bytes([medium[2], medium[3]]), 254);

        let long = encode(&Value::Bytes(Bytes::from(vec![7u8; 70_000])));
        assert_eq!(long[1], SIZE_U32_MARKER);
        assert_eq!(
            u32::from_le_bytes([long[2], long[3], long[4], long[5]]),
            70_000
        );
        assert_eq!(
            decode_value(&long, &registry()).unwrap(),
            Value::Bytes(Bytes::from(vec![7u8; 70_000]))
        );
    }

    #[test]
    fn alignment_is_relative_to_message_start() {
        let mut dst = BytesMut::from(&b"xyz"[..]);
        encode_value(&Value::Int(9), &registry(), &mut dst).unwrap();
        assert_eq!(&dst[..3], b"xyz");
        assert_eq!(
            decode_value(&dst[3..], &registry()).unwrap(),
            Value::Int(9)
        );
    }

    #[test]
    fn enum_and_composite_roundtrip() {
        let value = Value::Composite(Composite::new(
            130,
            vec![Value::Int(1), Value::Enum(EnumValue::new(129, 1))],
        ));
        let wire = encode(&value);
        assert_eq!(wire[0], 130);
        assert_eq!(decode_value(&wire, &registry()).unwrap(), value);
    }

    #[test]
    fn unknown_builtin_tag_is_malformed() {
        for tag in [5u8, 15, 64, 127] {
            assert!(matches!(
                decode_value(&[tag], &registry()),
                Err(CodecError::MalformedPayload(_))
            ));
        }
    }

    #[test]
    fn unknown_custom_tag_is_unknown_type() {
        assert_eq!(
            decode_value(&[200, tag::LIST, 0], &registry()),
            Err(CodecError::UnknownTypeId(200))
        );
    }

    #[test]
    fn enum_ordinal_out_of_range_is_schema_mismatch() {
        let wire = [129, tag::INT32, 0, 0, 7, 0, 0, 0];
        assert!(matches!(
            decode_value(&wire, &registry()),
            Err(CodecError::SchemaMismatch(_))
        ));
        let err = encode_value(
            &Value::Enum(EnumValue::new(129, 9)),
            &registry(),
            &mut BytesMut::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch(_)));
    }

    #[test]
    fn composite_wrong_field_count_is_schema_mismatch() {
        let wire = [130, tag::LIST, 1, tag::NULL];
        assert!(matches!(
            decode_value(&wire, &registry()),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn null_in_required_field_is_schema_mismatch() {
        let wire = [130, tag::LIST, 2, tag::NULL, tag::NULL];
        assert!(matches!(
            decode_value(&wire, &registry()),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn failed_encode_leaves_buffer_untouched() {
        let mut dst = BytesMut::from(&b"keep"[..]);
        let bad = Value::List(vec![
            Value::Int(1),
            Value::Composite(Composite::new(130, vec![Value::Null, Value::Null])),
        ]);
        assert!(encode_value(&bad, &registry(), &mut dst).is_err());
        assert_eq!(&dst[..], b"keep");
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        assert!(matches!(
            decode_value(&[tag::NULL, tag::NULL], &registry()),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        assert!(matches!(
            decode_value(&[tag::STRING, 2, 0xC3, 0x28], &registry()),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn oversized_child_count_fails_without_allocating() {
        let wire = [tag::LIST, SIZE_U32_MARKER, 0xFF, 0xFF, 0xFF, 0x7F];
        assert!(matches!(
            decode_value(&wire, &registry()),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(matches!(
            decode_value(&[], &registry()),
            Err(CodecError::MalformedPayload(_))
        ));
    }
}
