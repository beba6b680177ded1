use std::fmt;
use std::mem;

use bytes::Bytes;

/// Any value that can cross the bridge.
///
/// Integers are a single logical variant: the wire distinguishes 32- and
/// 64-bit encodings, but decoding always widens to `i64`.
///
/// Nesting depth is bounded only by the frame size, so dropping, cloning,
/// comparing and formatting walk the tree with a heap stack instead of
/// recursing. Because of the `Drop` impl, take container contents out with
/// the `into_*` accessors rather than by destructuring.
#[derive(Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Bytes),
    Int32List(Vec<i32>),
    Int64List(Vec<i64>),
    Float32List(Vec<f32>),
    Float64List(Vec<f64>),
    List(Vec<Value>),
    /// Ordered key/value pairs. Keys are arbitrary values, so no hashing.
    Map(Vec<(Value, Value)>),
    Enum(EnumValue),
    Composite(Composite),
}

/// An enum member carried by ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub type_id: u8,
    pub ordinal: u32,
}

/// A schema-declared record: fields in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub type_id: u8,
    pub fields: Vec<Value>,
}

impl EnumValue {
    pub fn new(type_id: u8, ordinal: u32) -> Self {
        Self { type_id, ordinal }
    }
}

impl Composite {
    pub fn new(type_id: u8, fields: Vec<Value>) -> Self {
        Self { type_id, fields }
    }

    /// Field at schema position `index`, or `Null` when out of range.
    pub fn field(&self, index: usize) -> &Value {
        static NULL: Value = Value::Null;
        self.fields.get(index).unwrap_or(&NULL)
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short variant name used in error messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Int32List(_) => "int32-list",
            Value::Int64List(_) => "int64-list",
            Value::Float32List(_) => "float32-list",
            Value::Float64List(_) => "float64-list",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Enum(_) => "enum",
            Value::Composite(_) => "composite",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Longest chain of nested containers; scalars have depth 0.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((value, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some(children) = value.children() {
                stack.extend(children.map(|child| (child, depth + 1)));
            }
        }
        deepest
    }

    pub fn into_string(mut self) -> Result<String, Value> {
        if let Value::String(s) = &mut self {
            return Ok(mem::take(s));
        }
        Err(self)
    }

    pub fn into_bytes(mut self) -> Result<Bytes, Value> {
        if let Value::Bytes(b) = &mut self {
            return Ok(mem::take(b));
        }
        Err(self)
    }

    pub fn into_int32_list(mut self) -> Result<Vec<i32>, Value> {
        if let Value::Int32List(items) = &mut self {
            return Ok(mem::take(items));
        }
        Err(self)
    }

    pub fn into_int64_list(mut self) -> Result<Vec<i64>, Value> {
        if let Value::Int64List(items) = &mut self {
            return Ok(mem::take(items));
        }
        Err(self)
    }

    pub fn into_float32_list(mut self) -> Result<Vec<f32>, Value> {
        if let Value::Float32List(items) = &mut self {
            return Ok(mem::take(items));
        }
        Err(self)
    }

    pub fn into_float64_list(mut self) -> Result<Vec<f64>, Value> {
        if let Value::Float64List(items) = &mut self {
            return Ok(mem::take(items));
        }
        Err(self)
    }

    pub fn into_list(mut self) -> Result<Vec<Value>, Value> {
        if let Value::List(items) = &mut self {
            return Ok(mem::take(items));
        }
        Err(self)
    }

    pub fn into_map(mut self) -> Result<Vec<(Value, Value)>, Value> {
        if let Value::Map(entries) = &mut self {
            return Ok(mem::take(entries));
        }
        Err(self)
    }

    pub fn into_composite(mut self) -> Result<Composite, Value> {
        if let Value::Composite(c) = &mut self {
            return Ok(Composite::new(c.type_id, mem::take(&mut c.fields)));
        }
        Err(self)
    }

    fn children(&self) -> Option<Children<'_>> {
        match self {
            Value::List(items) => Some(Children::Seq(items.iter())),
            Value::Composite(c) => Some(Children::Seq(c.fields.iter())),
            Value::Map(entries) => Some(Children::Pairs {
                iter: entries.iter(),
                value: None,
            }),
            _ => None,
        }
    }

    /// Copy of a scalar; containers come back empty.
    fn shallow_clone(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(*b),
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Float(*f),
            Value::String(s) => Value::String(s.clone()),
            Value::Bytes(b) => Value::Bytes(b.clone()),
            Value::Int32List(items) => Value::Int32List(items.clone()),
            Value::Int64List(items) => Value::Int64List(items.clone()),
            Value::Float32List(items) => Value::Float32List(items.clone()),
            Value::Float64List(items) => Value::Float64List(items.clone()),
            Value::List(_) => Value::List(Vec::new()),
            Value::Map(_) => Value::Map(Vec::new()),
            Value::Enum(e) => Value::Enum(*e),
            Value::Composite(c) => Value::Composite(Composite::new(c.type_id, Vec::new())),
        }
    }

    /// Look up a map entry by string key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Children of a container in wire order; map entries yield key, then value.
enum Children<'a> {
    Seq(std::slice::Iter<'a, Value>),
    Pairs {
        iter: std::slice::Iter<'a, (Value, Value)>,
        value: Option<&'a Value>,
    },
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        match self {
            Children::Seq(iter) => iter.next(),
            Children::Pairs { iter, value } => {
                if let Some(v) = value.take() {
                    return Some(v);
                }
                let (k, v) = iter.next()?;
                *value = Some(v);
                Some(k)
            }
        }
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = match self {
            Value::List(items) if !items.is_empty() => mem::take(items),
            Value::Composite(c) if !c.fields.is_empty() => mem::take(&mut c.fields),
            Value::Map(entries) if !entries.is_empty() => {
                mem::take(entries).into_iter().flat_map(|(k, v)| [k, v]).collect()
            }
            _ => return,
        };
        // Each popped value has its children moved out before it drops.
        while let Some(mut value) = pending.pop() {
            match &mut value {
                Value::List(items) => pending.append(items),
                Value::Composite(c) => pending.append(&mut c.fields),
                Value::Map(entries) => {
                    for (k, v) in entries.drain(..) {
                        pending.push(k);
                        pending.push(v);
                    }
                }
                _ => {}
            }
        }
    }
}

/// A container being rebuilt by [`Value::clone`].
struct CloneFrame<'a> {
    source: &'a Value,
    children: Children<'a>,
    out: Vec<Value>,
}

impl CloneFrame<'_> {
    fn finish(self) -> Value {
        match self.source {
            Value::Map(_) => {
                let mut items = self.out.into_iter();
                let mut entries = Vec::with_capacity(items.len() / 2);
                while let (Some(k), Some(v)) = (items.next(), items.next()) {
                    entries.push((k, v));
                }
                Value::Map(entries)
            }
            Value::Composite(c) => Value::Composite(Composite::new(c.type_id, self.out)),
            _ => Value::List(self.out),
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        let mut stack: Vec<CloneFrame<'_>> = Vec::new();
        let mut next = self;
        loop {
            let mut finished = match next.children() {
                Some(children) => {
                    stack.push(CloneFrame {
                        source: next,
                        children,
                        out: Vec::new(),
                    });
                    None
                }
                None => Some(next.shallow_clone()),
            };
            loop {
                let Some(top) = stack.last_mut() else {
                    return finished.unwrap_or_default();
                };
                if let Some(value) = finished.take() {
                    top.out.push(value);
                }
                if let Some(child) = top.children.next() {
                    next = child;
                    break;
                }
                finished = stack.pop().map(CloneFrame::finish);
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some(pair) = stack.pop() {
            let same = match pair {
                (Value::Null, Value::Null) => true,
                (Value::Bool(a), Value::Bool(b)) => a == b,
                (Value::Int(a), Value::Int(b)) => a == b,
                (Value::Float(a), Value::Float(b)) => a == b,
                (Value::String(a), Value::String(b)) => a == b,
                (Value::Bytes(a), Value::Bytes(b)) => a == b,
                (Value::Int32List(a), Value::Int32List(b)) => a == b,
                (Value::Int64List(a), Value::Int64List(b)) => a == b,
                (Value::Float32List(a), Value::Float32List(b)) => a == b,
                (Value::Float64List(a), Value::Float64List(b)) => a == b,
                (Value::Enum(a), Value::Enum(b)) => a == b,
                (Value::List(a), Value::List(b)) => a.len() == b.len(),
                (Value::Map(a), Value::Map(b)) => a.len() == b.len(),
                (Value::Composite(a), Value::Composite(b)) => {
                    a.type_id == b.type_id && a.fields.len() == b.fields.len()
                }
                _ => false,
            };
            if !same {
                return false;
            }
            if let (Some(left), Some(right)) = (pair.0.children(), pair.1.children()) {
                stack.extend(left.zip(right));
            }
        }
        true
    }
}

/// Piece of [`Value`]'s debug output still to be written.
enum DebugStep<'a> {
    Value(&'a Value),
    Text(&'static str),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![DebugStep::Value(self)];
        while let Some(step) = stack.pop() {
            let value = match step {
                DebugStep::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                DebugStep::Value(value) => value,
            };
            let close = match value {
                Value::Null => {
                    f.write_str("Null")?;
                    continue;
                }
                Value::Bool(b) => {
                    write!(f, "Bool({b:?})")?;
                    continue;
                }
                Value::Int(i) => {
                    write!(f, "Int({i:?})")?;
                    continue;
                }
                Value::Float(x) => {
                    write!(f, "Float({x:?})")?;
                    continue;
                }
                Value::String(s) => {
                    write!(f, "String({s:?})")?;
                    continue;
                }
                Value::Bytes(b) => {
                    write!(f, "Bytes({b:?})")?;
                    continue;
                }
                Value::Int32List(items) => {
                    write!(f, "Int32List({items:?})")?;
                    continue;
                }
                Value::Int64List(items) => {
                    write!(f, "Int64List({items:?})")?;
                    continue;
                }
                Value::Float32List(items) => {
                    write!(f, "Float32List({items:?})")?;
                    continue;
                }
                Value::Float64List(items) => {
                    write!(f, "Float64List({items:?})")?;
                    continue;
                }
                Value::Enum(e) => {
                    write!(f, "Enum({e:?})")?;
                    continue;
                }
                Value::List(_) => {
                    f.write_str("List([")?;
                    "])"
                }
                Value::Map(_) => {
                    f.write_str("Map([")?;
                    "])"
                }
                Value::Composite(c) => {
                    write!(f, "Composite(Composite {{ type_id: {}, fields: [", c.type_id)?;
                    "] })"
                }
            };

            stack.push(DebugStep::Text(close));
            let is_map = matches!(value, Value::Map(_));
            let children: Vec<&Value> = value.children().into_iter().flatten().collect();
            let width = if is_map { 2 } else { 1 };
            // Pushed in reverse so the first child is written first.
            for (index, chunk) in children.chunks(width).enumerate().rev() {
                if is_map {
                    stack.push(DebugStep::Text(")"));
                    stack.push(DebugStep::Value(chunk[1]));
                    stack.push(DebugStep::Text(", "));
                    stack.push(DebugStep::Value(chunk[0]));
                    stack.push(DebugStep::Text("("));
                } else {
                    stack.push(DebugStep::Value(chunk[0]));
                }
                if index > 0 {
                    stack.push(DebugStep::Text(", "));
                }
            }
        }
        Ok(())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Bytes(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<EnumValue> for Value {
    fn from(value: EnumValue) -> Self {
        Value::Enum(value)
    }
}

impl From<Composite> for Value {
    fn from(value: Composite) -> Self {
        Value::Composite(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
