//! Borrowed, tagged view of a stored value.

use packjson_core::ValueType;

use crate::arena::ObjectRef;

/// A value read from (or about to be written into) an arena.
///
/// String and object variants borrow from their buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value<'a> {
    /// 32-bit signed integer.
    Int(i32),
    /// Single-precision float.
    Float(f32),
    /// UTF-8 text without interior NUL bytes.
    Str(&'a str),
    /// A nested arena.
    Object(ObjectRef<'a>),
    /// JSON `null`, or space reserved for a value not yet written.
    Null,
}

impl Value<'_> {
    /// The on-buffer type tag for this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Str(_) => ValueType::String,
            Self::Object(_) => ValueType::Object,
            Self::Null => ValueType::Null,
        }
    }

    /// The integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    /// The float, if this is a `Float`.
    pub fn as_float(&self) -> Option<f32> {
        match *self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    /// The text, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i32> for Value<'_> {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value<'_> {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Self::Str(v)
    }
}

impl<'a> From<ObjectRef<'a>> for Value<'a> {
    fn from(v: ObjectRef<'a>) -> Self {
        Self::Object(v)
    }
}

/// Decode value bytes of a known type.
///
/// The caller guarantees `bytes` is a validated slot of type `ty`.
pub(crate) fn decode(ty: ValueType, bytes: &[u8]) -> Value<'_> {
    match ty {
        ValueType::Int => Value::Int(i32::from_le_bytes(word(bytes))),
        ValueType::Float => Value::Float(f32::from_le_bytes(word(bytes))),
        ValueType::String => Value::Str(until_nul(bytes)),
        ValueType::Object => Value::Object(ObjectRef::view(bytes)),
        ValueType::Null => Value::Null,
    }
}

fn word(bytes: &[u8]) -> [u8; 4] {
    let mut w = [0u8; 4];
    w.copy_from_slice(&bytes[..4]);
    w
}

/// Text up to the first NUL. Invalid UTF-8 yields the longest valid prefix.
pub(crate) fn until_nul(bytes: &[u8]) -> &str {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    match std::str::from_utf8(&bytes[..end]) {
        Ok(s) => s,
        Err(e) => std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
    }
}
