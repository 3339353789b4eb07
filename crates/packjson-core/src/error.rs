//! Error taxonomy for the table engine and codec.
//!
//! Every fallible primitive returns a [`JsonError`] and leaves the arena in
//! the state it was in before the call. The variants map onto the numeric
//! status codes (see [`JsonError::code`]) so an ownership layer
//! can decide whether to grow and retry.

use std::error::Error;
use std::fmt;

use crate::value::ValueType;

/// Errors returned by arena, codec, and growth operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JsonError {
    /// Unsupported input or invalid argument (code `-1`).
    Generic {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// Malformed JSON text (code `-1`).
    Syntax {
        /// Byte offset into the input where parsing stopped.
        position: usize,
        /// What the parser expected at that position.
        expected: &'static str,
    },
    /// A rebuild needed more scratch space than the region allows
    /// (code `-1`).
    ScratchExhausted {
        /// Bytes the rebuild asked for.
        requested: usize,
        /// The scratch region's byte limit.
        limit: usize,
    },
    /// Lookup, set, or delete on an absent key (code `-2`).
    NoMatchedKey,
    /// Insert of a key that is already present (code `-3`).
    KeyExists,
    /// Every table slot is in use (code `-4`).
    TableFull {
        /// Current table size.
        table_size: usize,
    },
    /// Not enough content space left in the buffer (code `-5`).
    BufferFull {
        /// Bytes the operation needed.
        requested: usize,
        /// Bytes that were free.
        available: usize,
    },
    /// An in-place set does not fit the slot reserved for the value
    /// (code `-6`).
    EntryBufferFull {
        /// Encoded size of the new value.
        requested: usize,
        /// Size of the existing slot.
        reserved: usize,
    },
    /// Typed access on a value of a different type (code `-7`).
    TypeMismatch {
        /// The type the caller asked for.
        expected: ValueType,
        /// The type actually stored.
        found: ValueType,
    },
}

impl JsonError {
    /// Shorthand for [`JsonError::Generic`].
    pub fn generic(reason: impl Into<String>) -> Self {
        Self::Generic {
            reason: reason.into(),
        }
    }

    /// Integer status code: `-1` generic through `-7` type mismatch.
    pub fn code(&self) -> i32 {
        match self {
            Self::Generic { .. } | Self::Syntax { .. } | Self::ScratchExhausted { .. } => -1,
            Self::NoMatchedKey => -2,
            Self::KeyExists => -3,
            Self::TableFull { .. } => -4,
            Self::BufferFull { .. } => -5,
            Self::EntryBufferFull { .. } => -6,
            Self::TypeMismatch { .. } => -7,
        }
    }

    /// Whether growing the table or buffer and retrying can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TableFull { .. } | Self::BufferFull { .. })
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic { reason } => write!(f, "{reason}"),
            Self::Syntax { position, expected } => {
                write!(f, "syntax error at byte {position}: expected {expected}")
            }
            Self::ScratchExhausted { requested, limit } => write!(
                f,
                "scratch exhausted: requested {requested} bytes, limit {limit} bytes"
            ),
            Self::NoMatchedKey => write!(f, "no matched key"),
            Self::KeyExists => write!(f, "key already exists"),
            Self::TableFull { table_size } => {
                write!(f, "table full ({table_size} slots in use)")
            }
            Self::BufferFull {
                requested,
                available,
            } => write!(
                f,
                "buffer full: requested {requested} bytes, {available} bytes available"
            ),
            Self::EntryBufferFull {
                requested,
                reserved,
            } => write!(
                f,
                "entry buffer full: value needs {requested} bytes, slot holds {reserved}"
            ),
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {expected}, found {found}")
            }
        }
    }
}

impl Error for JsonError {}
