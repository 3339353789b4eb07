//! Byte layout of an arena buffer.
//!
//! ```text
//! ┌────────────┬──────────────────────────┬───────────────────────────┐
//! │ Header     │ Entry[table_size]        │ content (keys + values)   │
//! │ 24 bytes   │ 20 bytes each            │ content_start .. buf_idx  │
//! └────────────┴──────────────────────────┴───────────────────────────┘
//! ```
//!
//! All multi-byte fields are little-endian. Every location stored inside
//! the buffer is an offset from the arena's own first byte, so an arena
//! image can be copied anywhere without fix-up.

use packjson_core::ValueType;

/// Size of the arena header in bytes.
pub const HEADER_SIZE: usize = 24;

/// Size of one table entry in bytes.
pub const ENTRY_SIZE: usize = 20;

/// Right shift applied to the probe perturbation after each step.
pub const PERTURB_SHIFT: u32 = 5;

/// Probes taken before the perturbation has shifted down to zero.
///
/// After this many steps the probe recurrence is `5 * idx + 1`, which has
/// full period modulo any power of two, so `table_size + PERTURB_DRAIN`
/// probes visit every slot.
pub const PERTURB_DRAIN: usize = 8;

/// Alignment granule for string value slots.
pub const STRING_ALIGN: usize = 8;

/// Largest buffer an arena can describe (offsets are `u32`).
pub const MAX_BUFFER_SIZE: usize = u32::MAX as usize;

/// Deepest chain of nested objects accepted when parsing or validating.
pub const MAX_NESTING_DEPTH: usize = 64;

// ── Header field offsets ─────────────────────────────────────────

pub(crate) const BUF_SIZE: usize = 0;
pub(crate) const BUF_IDX: usize = 4;
pub(crate) const TABLE_SIZE: usize = 8;
pub(crate) const ENTRY_COUNT: usize = 12;
pub(crate) const PARENT_OFFSET: usize = 16;
pub(crate) const PARENT_ENTRY: usize = 20;

// ── Entry field offsets ──────────────────────────────────────────

const E_HASH: usize = 0;
const E_KEY: usize = 4;
const E_VALUE: usize = 8;
const E_VALUE_SIZE: usize = 12;
const E_TYPE: usize = 16;

/// Byte offset of the first content byte for a table of `table_size` slots.
#[inline]
pub fn content_start(table_size: usize) -> usize {
    HEADER_SIZE + table_size * ENTRY_SIZE
}

/// Smallest buffer that can hold an empty arena with `table_size` slots.
///
/// Identical to [`content_start`]; named separately for call sites that
/// size buffers rather than address them.
#[inline]
pub fn required_size(table_size: usize) -> usize {
    content_start(table_size)
}

/// Slot size reserved for a string of `len` bytes: the next multiple of
/// [`STRING_ALIGN`] strictly greater than `len`, which always leaves room
/// for the terminating NUL.
#[inline]
pub fn string_slot_size(len: usize) -> usize {
    ((len + 1) / STRING_ALIGN + 1) * STRING_ALIGN
}

/// Byte offset of table slot `slot`.
#[inline]
pub(crate) fn entry_offset(slot: usize) -> usize {
    HEADER_SIZE + slot * ENTRY_SIZE
}

#[inline]
pub(crate) fn read_u32(buf: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(word)
}

#[inline]
pub(crate) fn write_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// Decoded table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) struct Entry {
    pub hash: i32,
    pub key_offset: u32,
    pub value_offset: u32,
    pub value_size: u32,
    pub tag: u8,
}

impl Entry {
    /// Slots with a zero key offset are empty; offset 0 is always the header.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.key_offset == 0
    }

    #[inline]
    pub fn value_type(&self) -> Option<ValueType> {
        ValueType::from_tag(self.tag)
    }

    /// Content range of the value bytes.
    #[inline]
    pub fn value_range(&self) -> std::ops::Range<usize> {
        let start = self.value_offset as usize;
        start..start + self.value_size as usize
    }

    pub fn read(buf: &[u8], slot: usize) -> Self {
        let at = entry_offset(slot);
        Self {
            hash: read_u32(buf, at + E_HASH) as i32,
            key_offset: read_u32(buf, at + E_KEY),
            value_offset: read_u32(buf, at + E_VALUE),
            value_size: read_u32(buf, at + E_VALUE_SIZE),
            tag: buf[at + E_TYPE],
        }
    }

    pub fn write(&self, buf: &mut [u8], slot: usize) {
        let at = entry_offset(slot);
        write_u32(buf, at + E_HASH, self.hash as u32);
        write_u32(buf, at + E_KEY, self.key_offset);
        write_u32(buf, at + E_VALUE, self.value_offset);
        write_u32(buf, at + E_VALUE_SIZE, self.value_size);
        buf[at + E_TYPE..at + ENTRY_SIZE].fill(0);
        buf[at + E_TYPE] = self.tag;
    }

    pub fn clear(buf: &mut [u8], slot: usize) {
        let at = entry_offset(slot);
        buf[at..at + ENTRY_SIZE].fill(0);
    }
}
