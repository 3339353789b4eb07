//! Value type tags stored in the entry table.

use std::fmt;

/// The type of a value stored in an arena entry.
///
/// The discriminants are the on-buffer tag bytes. Tag `0` is never written
/// for a live entry, and tags `5` and `7` are reserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueType {
    /// 32-bit signed integer, 4 bytes little-endian.
    Int = 1,
    /// IEEE-754 single precision float, 4 bytes little-endian.
    Float = 2,
    /// NUL-terminated UTF-8 bytes, padded to a multiple of 8.
    String = 3,
    /// A complete nested arena.
    Object = 4,
    /// Reserved space with no value yet, or a JSON `null`.
    Null = 6,
}

impl ValueType {
    /// The tag byte written into the entry table.
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Decode a tag byte. Returns `None` for unknown tags.
    #[inline]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Int),
            2 => Some(Self::Float),
            3 => Some(Self::String),
            4 => Some(Self::Object),
            6 => Some(Self::Null),
            _ => None,
        }
    }

    /// Encoded size for fixed-width types, `None` for variable-width ones.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Int | Self::Float => Some(4),
            Self::String | Self::Object | Self::Null => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Object => "object",
            Self::Null => "null",
        };
        f.write_str(name)
    }
}
