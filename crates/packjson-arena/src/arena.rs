//! The arena: header access, the open-addressing table engine, typed
//! reads, and in-place sets.
//!
//! An [`Arena`] is generic over its backing storage so the same engine
//! runs over an owned `Vec<u8>`, a borrowed slice, or a nested object's
//! sub-range of a parent buffer.

use std::fmt;

use packjson_core::{key_hash, JsonError, ValueType};

use crate::layout::{
    self, content_start, read_u32, string_slot_size, write_u32, Entry, BUF_IDX, BUF_SIZE,
    ENTRY_COUNT, ENTRY_SIZE, HEADER_SIZE, MAX_BUFFER_SIZE, MAX_NESTING_DEPTH, PARENT_ENTRY,
    PARENT_OFFSET, TABLE_SIZE,
};
use crate::probe::Probe;
use crate::value::{self, Value};

/// A hash-indexed JSON object packed into one contiguous buffer.
///
/// Operations never allocate and never grow the buffer. Capacity errors
/// ([`JsonError::TableFull`], [`JsonError::BufferFull`]) leave the arena
/// untouched so an owner can grow it and retry.
#[derive(Clone, Copy)]
pub struct Arena<B> {
    buf: B,
}

/// An arena that owns its buffer.
pub type OwnedArena = Arena<Vec<u8>>;

/// Read-only view of an arena, typically a nested object inside a parent.
pub type ObjectRef<'a> = Arena<&'a [u8]>;

/// Mutable view of an arena. Writes go straight into the underlying bytes.
pub type ObjectMut<'a> = Arena<&'a mut [u8]>;

/// Where a nested arena sits inside its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParentLink {
    /// Offset of the nested arena's first byte within the parent arena.
    pub offset: usize,
    /// Parent table slot holding the nested arena.
    pub entry_index: usize,
}

/// Result of probing for a key.
enum Probed {
    Found(usize),
    Vacant(usize),
    Exhausted,
}

impl<B> Arena<B> {
    /// Wrap storage already known to hold a valid arena image.
    pub(crate) fn from_raw(buf: B) -> Self {
        Self { buf }
    }

    pub(crate) fn storage_mut(&mut self) -> &mut B {
        &mut self.buf
    }
}

impl<'a> Arena<&'a [u8]> {
    /// View over bytes already known to hold a valid arena image.
    pub(crate) fn view(bytes: &'a [u8]) -> Self {
        Self { buf: bytes }
    }
}

impl<'a> Arena<&'a mut [u8]> {
    pub(crate) fn view_mut(bytes: &'a mut [u8]) -> Self {
        Self { buf: bytes }
    }
}

impl OwnedArena {
    /// Allocate a zeroed buffer of `buf_size` bytes and initialise it.
    pub fn new(buf_size: usize, table_size: usize) -> Result<Self, JsonError> {
        Self::init(vec![0; buf_size], table_size)
    }
}

// ── Read side ────────────────────────────────────────────────────

impl<B: AsRef<[u8]>> Arena<B> {
    /// Adopt a buffer that already holds an arena image.
    ///
    /// The header, every live entry, and every nested object are checked,
    /// so later reads cannot run outside the buffer.
    pub fn from_buffer(buf: B) -> Result<Self, JsonError> {
        validate(buf.as_ref(), 0)?;
        Ok(Self { buf })
    }

    #[inline]
    pub(crate) fn raw(&self) -> &[u8] {
        self.buf.as_ref()
    }

    #[inline]
    fn header(&self, field: usize) -> usize {
        read_u32(self.raw(), field) as usize
    }

    /// Usable size of the buffer in bytes.
    pub fn buf_size(&self) -> usize {
        self.header(BUF_SIZE)
    }

    /// Offset of the next free content byte.
    pub fn buf_idx(&self) -> usize {
        self.header(BUF_IDX)
    }

    /// Number of table slots (a power of two).
    pub fn table_size(&self) -> usize {
        self.header(TABLE_SIZE)
    }

    /// Number of live entries.
    pub fn entry_count(&self) -> usize {
        self.header(ENTRY_COUNT)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entry_count()
    }

    /// Whether the arena holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Content bytes still free.
    pub fn remaining(&self) -> usize {
        self.buf_size() - self.buf_idx()
    }

    /// Offset of the first content byte.
    pub fn content_start(&self) -> usize {
        content_start(self.table_size())
    }

    /// Link to the parent slot, or `None` for a top-level arena.
    pub fn parent_link(&self) -> Option<ParentLink> {
        match self.header(PARENT_OFFSET) {
            0 => None,
            offset => Some(ParentLink {
                offset,
                entry_index: self.header(PARENT_ENTRY),
            }),
        }
    }

    /// The arena image: the first `buf_size` bytes of the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw()[..self.buf_size()]
    }

    /// Borrow the image as a read-only object view.
    pub fn as_object(&self) -> ObjectRef<'_> {
        ObjectRef::view(self.as_bytes())
    }

    /// Give the backing storage back.
    pub fn into_inner(self) -> B {
        self.buf
    }

    #[inline]
    pub(crate) fn entry(&self, slot: usize) -> Entry {
        Entry::read(self.raw(), slot)
    }

    fn probe_key(&self, key: &[u8], hash: i32) -> Probed {
        let raw = self.raw();
        for slot in Probe::new(hash, self.table_size()) {
            let entry = Entry::read(raw, slot);
            if entry.is_empty() {
                return Probed::Vacant(slot);
            }
            if entry.hash == hash && key_bytes(raw, &entry) == key {
                return Probed::Found(slot);
            }
        }
        Probed::Exhausted
    }

    /// Table slot holding `key`, if present.
    pub fn locate(&self, key: &str) -> Option<usize> {
        let key = key.as_bytes();
        match self.probe_key(key, key_hash(key)) {
            Probed::Found(slot) => Some(slot),
            Probed::Vacant(_) | Probed::Exhausted => None,
        }
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.locate(key).is_some()
    }

    /// Raw value bytes of `key`, only if it is stored as `ty`.
    pub fn get(&self, key: &str, ty: ValueType) -> Option<&[u8]> {
        self.lookup(key, ty).ok()
    }

    /// Like [`get`](Self::get), but reports why the lookup failed.
    pub fn lookup(&self, key: &str, ty: ValueType) -> Result<&[u8], JsonError> {
        let slot = self.locate(key).ok_or(JsonError::NoMatchedKey)?;
        let entry = self.entry(slot);
        let found = stored_type(&entry)?;
        if found != ty {
            return Err(JsonError::TypeMismatch {
                expected: ty,
                found,
            });
        }
        Ok(&self.raw()[entry.value_range()])
    }

    /// The integer stored under `key`.
    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.value(key)?.as_int()
    }

    /// The float stored under `key`.
    pub fn get_float(&self, key: &str) -> Option<f32> {
        self.value(key)?.as_float()
    }

    /// The string stored under `key`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key, ValueType::String).map(value::until_nul)
    }

    /// The tagged value stored under `key`.
    pub fn value(&self, key: &str) -> Option<Value<'_>> {
        let slot = self.locate(key)?;
        self.entry_ref(slot).map(|e| e.value())
    }

    /// The live entry in `slot`, if any.
    pub fn entry_ref(&self, slot: usize) -> Option<EntryRef<'_>> {
        entry_ref(self.raw(), slot)
    }

    /// Live entries in table order.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            raw: self.raw(),
            next: 0,
            table_size: self.table_size(),
        }
    }
}

/// Key bytes of a live entry. The key is followed by a NUL that sits
/// directly before the value.
#[inline]
fn key_bytes<'a>(raw: &'a [u8], entry: &Entry) -> &'a [u8] {
    &raw[entry.key_offset as usize..entry.value_offset as usize - 1]
}

fn stored_type(entry: &Entry) -> Result<ValueType, JsonError> {
    entry
        .value_type()
        .ok_or_else(|| JsonError::generic(format!("unknown value tag {}", entry.tag)))
}

fn entry_ref(raw: &[u8], slot: usize) -> Option<EntryRef<'_>> {
    if slot >= read_u32(raw, TABLE_SIZE) as usize {
        return None;
    }
    let entry = Entry::read(raw, slot);
    if entry.is_empty() {
        return None;
    }
    Some(EntryRef {
        slot,
        key: key_bytes(raw, &entry),
        ty: entry.value_type()?,
        bytes: &raw[entry.value_range()],
    })
}

/// A live table entry.
#[derive(Clone, Copy, Debug)]
pub struct EntryRef<'a> {
    slot: usize,
    key: &'a [u8],
    ty: ValueType,
    bytes: &'a [u8],
}

impl<'a> EntryRef<'a> {
    /// Table slot index.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// The key.
    pub fn key(&self) -> &'a str {
        value::until_nul(self.key)
    }

    /// The key as stored, without its terminating NUL.
    pub fn key_bytes(&self) -> &'a [u8] {
        self.key
    }

    /// Stored type tag.
    pub fn value_type(&self) -> ValueType {
        self.ty
    }

    /// The whole value slot, padding included.
    pub fn raw_value(&self) -> &'a [u8] {
        self.bytes
    }

    /// The decoded value.
    pub fn value(&self) -> Value<'a> {
        value::decode(self.ty, self.bytes)
    }
}

/// Iterator over live entries in table order. See [`Arena::entries`].
#[derive(Clone, Debug)]
pub struct Entries<'a> {
    raw: &'a [u8],
    next: usize,
    table_size: usize,
}

impl<'a> Iterator for Entries<'a> {
    type Item = EntryRef<'a>;

    fn next(&mut self) -> Option<EntryRef<'a>> {
        while self.next < self.table_size {
            let slot = self.next;
            self.next += 1;
            if let Some(entry) = entry_ref(self.raw, slot) {
                return Some(entry);
            }
        }
        None
    }
}

// ── Write side ───────────────────────────────────────────────────

impl<B: AsRef<[u8]> + AsMut<[u8]>> Arena<B> {
    /// Zero `buf` and write an empty arena with `table_size` slots.
    ///
    /// `table_size` must be a non-zero power of two. The whole buffer
    /// becomes the arena (`buf_size == buf.len()`).
    pub fn init(mut buf: B, table_size: usize) -> Result<Self, JsonError> {
        check_table_size(table_size)?;
        let len = buf.as_ref().len();
        if len > MAX_BUFFER_SIZE {
            return Err(JsonError::generic(format!(
                "buffer of {len} bytes exceeds the {MAX_BUFFER_SIZE} byte limit"
            )));
        }
        let required = layout::required_size(table_size);
        if len < required {
            return Err(JsonError::BufferFull {
                requested: required,
                available: len,
            });
        }
        buf.as_mut().fill(0);
        let mut arena = Self { buf };
        arena.set_header(BUF_SIZE, len);
        arena.set_header(BUF_IDX, required);
        arena.set_header(TABLE_SIZE, table_size);
        Ok(arena)
    }

    #[inline]
    pub(crate) fn raw_mut(&mut self) -> &mut [u8] {
        self.buf.as_mut()
    }

    #[inline]
    pub(crate) fn set_header(&mut self, field: usize, value: usize) {
        write_u32(self.raw_mut(), field, value as u32);
    }

    /// Zero the image and lay out an empty table of `table_size` slots.
    /// `buf_size` and the parent link survive.
    pub(crate) fn format(&mut self, table_size: usize) {
        let buf_size = self.buf_size();
        let parent_offset = self.header(PARENT_OFFSET);
        let parent_entry = self.header(PARENT_ENTRY);
        self.raw_mut()[..buf_size].fill(0);
        self.set_header(BUF_SIZE, buf_size);
        self.set_header(BUF_IDX, content_start(table_size));
        self.set_header(TABLE_SIZE, table_size);
        self.set_header(PARENT_OFFSET, parent_offset);
        self.set_header(PARENT_ENTRY, parent_entry);
    }

    /// Remove every entry and reclaim all content space.
    pub fn clear(&mut self) {
        self.format(self.table_size());
    }

    /// Insert `key` with a `size`-byte value of type `ty`, filled by
    /// `fill` (which receives zeroed bytes). Returns the slot.
    pub(crate) fn insert_with(
        &mut self,
        key: &[u8],
        ty: ValueType,
        size: usize,
        fill: impl FnOnce(&mut [u8]),
    ) -> Result<usize, JsonError> {
        if key.contains(&0) {
            return Err(JsonError::generic("keys must not contain NUL bytes"));
        }
        let table_size = self.table_size();
        if self.entry_count() >= table_size {
            return Err(JsonError::TableFull { table_size });
        }
        let hash = key_hash(key);
        let slot = match self.probe_key(key, hash) {
            Probed::Found(_) => return Err(JsonError::KeyExists),
            Probed::Vacant(slot) => slot,
            Probed::Exhausted => return Err(JsonError::TableFull { table_size }),
        };

        let available = self.remaining();
        let requested = key.len().saturating_add(1).saturating_add(size);
        if requested > available {
            return Err(JsonError::BufferFull {
                requested,
                available,
            });
        }

        let key_offset = self.buf_idx();
        let value_offset = key_offset + key.len() + 1;
        let count = self.entry_count();
        let raw = self.raw_mut();
        raw[key_offset..value_offset - 1].copy_from_slice(key);
        raw[value_offset - 1] = 0;
        let dst = &mut raw[value_offset..value_offset + size];
        dst.fill(0);
        fill(dst);
        Entry {
            hash,
            key_offset: key_offset as u32,
            value_offset: value_offset as u32,
            value_size: size as u32,
            tag: ty.tag(),
        }
        .write(raw, slot);
        self.set_header(BUF_IDX, value_offset + size);
        self.set_header(ENTRY_COUNT, count + 1);
        Ok(slot)
    }

    /// Insert a tagged value. Returns the slot.
    pub fn insert(&mut self, key: &str, value: Value<'_>) -> Result<usize, JsonError> {
        match value {
            Value::Int(v) => self.insert_int(key, v),
            Value::Float(v) => self.insert_float(key, v),
            Value::Str(v) => self.insert_str(key, v),
            Value::Object(child) => self.insert_object(key, &child),
            Value::Null => self.insert_null(key),
        }
    }

    /// Insert an integer.
    pub fn insert_int(&mut self, key: &str, v: i32) -> Result<usize, JsonError> {
        self.insert_with(key.as_bytes(), ValueType::Int, 4, |dst| {
            dst.copy_from_slice(&v.to_le_bytes())
        })
    }

    /// Insert a float.
    pub fn insert_float(&mut self, key: &str, v: f32) -> Result<usize, JsonError> {
        self.insert_with(key.as_bytes(), ValueType::Float, 4, |dst| {
            dst.copy_from_slice(&v.to_le_bytes())
        })
    }

    /// Insert a string. The slot is padded so later, slightly longer
    /// strings can be set in place.
    pub fn insert_str(&mut self, key: &str, v: &str) -> Result<usize, JsonError> {
        check_string(v)?;
        let bytes = v.as_bytes();
        self.insert_with(
            key.as_bytes(),
            ValueType::String,
            string_slot_size(bytes.len()),
            |dst| dst[..bytes.len()].copy_from_slice(bytes),
        )
    }

    /// Insert a `null`.
    pub fn insert_null(&mut self, key: &str) -> Result<usize, JsonError> {
        self.insert_with(key.as_bytes(), ValueType::Null, 0, |_| {})
    }

    /// Overwrite the value of an existing key in place.
    ///
    /// The stored type must match and the new encoding must fit the slot.
    pub fn set(&mut self, key: &str, value: Value<'_>) -> Result<(), JsonError> {
        match value {
            Value::Int(v) => self.set_int(key, v),
            Value::Float(v) => self.set_float(key, v),
            Value::Str(v) => self.set_str(key, v),
            Value::Null => self.overwrite(key, ValueType::Null, 0, |_| {}).map(drop),
            Value::Object(child) => {
                let image = child.as_bytes();
                let slot = self.overwrite(key, ValueType::Object, image.len(), |dst| {
                    dst[..image.len()].copy_from_slice(image)
                })?;
                self.link_child(slot);
                Ok(())
            }
        }
    }

    /// Overwrite an integer in place.
    pub fn set_int(&mut self, key: &str, v: i32) -> Result<(), JsonError> {
        self.overwrite(key, ValueType::Int, 4, |dst| {
            dst[..4].copy_from_slice(&v.to_le_bytes())
        })
        .map(drop)
    }

    /// Overwrite a float in place.
    pub fn set_float(&mut self, key: &str, v: f32) -> Result<(), JsonError> {
        self.overwrite(key, ValueType::Float, 4, |dst| {
            dst[..4].copy_from_slice(&v.to_le_bytes())
        })
        .map(drop)
    }

    /// Overwrite a string in place. Fails with
    /// [`JsonError::EntryBufferFull`] if the padded encoding is larger
    /// than the existing slot.
    pub fn set_str(&mut self, key: &str, v: &str) -> Result<(), JsonError> {
        check_string(v)?;
        let bytes = v.as_bytes();
        self.overwrite(
            key,
            ValueType::String,
            string_slot_size(bytes.len()),
            |dst| dst[..bytes.len()].copy_from_slice(bytes),
        )
        .map(drop)
    }

    fn overwrite(
        &mut self,
        key: &str,
        ty: ValueType,
        size: usize,
        fill: impl FnOnce(&mut [u8]),
    ) -> Result<usize, JsonError> {
        let slot = self.locate(key).ok_or(JsonError::NoMatchedKey)?;
        let entry = self.entry(slot);
        let found = stored_type(&entry)?;
        if found != ty {
            return Err(JsonError::TypeMismatch { expected: ty, found });
        }
        let reserved = entry.value_size as usize;
        if size > reserved {
            return Err(JsonError::EntryBufferFull {
                requested: size,
                reserved,
            });
        }
        let dst = &mut self.raw_mut()[entry.value_range()];
        dst.fill(0);
        fill(dst);
        Ok(slot)
    }

    /// Mark `slot` as an object and point the child's header back at it.
    pub(crate) fn link_child(&mut self, slot: usize) {
        let mut entry = self.entry(slot);
        entry.tag = ValueType::Object.tag();
        let raw = self.raw_mut();
        entry.write(raw, slot);
        let base = entry.value_offset as usize;
        write_u32(raw, base + PARENT_OFFSET, entry.value_offset);
        write_u32(raw, base + PARENT_ENTRY, slot as u32);
    }
}

pub(crate) fn check_table_size(table_size: usize) -> Result<(), JsonError> {
    if table_size == 0 || !table_size.is_power_of_two() {
        return Err(JsonError::generic(format!(
            "table size {table_size} is not a power of two"
        )));
    }
    let fits = table_size
        .checked_mul(ENTRY_SIZE)
        .and_then(|t| t.checked_add(HEADER_SIZE))
        .is_some_and(|n| n <= MAX_BUFFER_SIZE);
    if !fits {
        return Err(JsonError::generic(format!(
            "table size {table_size} is too large"
        )));
    }
    Ok(())
}

fn check_string(v: &str) -> Result<(), JsonError> {
    if v.as_bytes().contains(&0) {
        return Err(JsonError::generic("string values must not contain NUL bytes"));
    }
    Ok(())
}

// ── Image validation ─────────────────────────────────────────────

fn validate(buf: &[u8], depth: usize) -> Result<(), JsonError> {
    let invalid = |what: &str| JsonError::generic(format!("invalid arena image: {what}"));
    if depth > MAX_NESTING_DEPTH {
        return Err(invalid("objects nested too deeply"));
    }
    if buf.len() < HEADER_SIZE {
        return Err(invalid("shorter than the header"));
    }
    let field = |at| read_u32(buf, at) as usize;
    let (buf_size, buf_idx, table_size, entry_count) = (
        field(BUF_SIZE),
        field(BUF_IDX),
        field(TABLE_SIZE),
        field(ENTRY_COUNT),
    );
    if buf_size > buf.len() {
        return Err(invalid("buf_size exceeds the buffer"));
    }
    check_table_size(table_size).map_err(|_| invalid("bad table size"))?;
    let start = content_start(table_size);
    if start > buf_size {
        return Err(invalid("table does not fit"));
    }
    if buf_idx < start || buf_idx > buf_size {
        return Err(invalid("content cursor out of range"));
    }
    if entry_count > table_size {
        return Err(invalid("more entries than slots"));
    }

    let mut live = 0;
    // (start, end) of each entry's key and value bytes, and its key.
    let mut spans: Vec<(usize, usize, &[u8])> = Vec::with_capacity(entry_count);
    for slot in 0..table_size {
        let entry = Entry::read(buf, slot);
        if entry.is_empty() {
            continue;
        }
        live += 1;
        let ty = entry
            .value_type()
            .ok_or_else(|| invalid("unknown value tag"))?;
        let key_start = entry.key_offset as usize;
        let value_start = entry.value_offset as usize;
        let value_end = value_start
            .checked_add(entry.value_size as usize)
            .ok_or_else(|| invalid("value size overflows"))?;
        if key_start < start || value_start <= key_start || value_end > buf_idx {
            return Err(invalid("entry outside the content region"));
        }
        let key = &buf[key_start..value_start - 1];
        if buf[value_start - 1] != 0 || key.contains(&0) {
            return Err(invalid("key is not NUL-terminated"));
        }
        if std::str::from_utf8(key).is_err() {
            return Err(invalid("key is not UTF-8"));
        }
        if key_hash(key) != entry.hash {
            return Err(invalid("stored hash does not match key"));
        }
        spans.push((key_start, value_end, key));
        let bytes = &buf[value_start..value_end];
        if ty.fixed_size().is_some_and(|size| bytes.len() < size) {
            return Err(invalid("numeric value shorter than its type"));
        }
        match ty {
            ValueType::String => {
                let end = bytes
                    .iter()
                    .position(|&b| b == 0)
                    .ok_or_else(|| invalid("string is not NUL-terminated"))?;
                if std::str::from_utf8(&bytes[..end]).is_err() {
                    return Err(invalid("string is not UTF-8"));
                }
            }
            ValueType::Object => validate(bytes, depth + 1)?,
            _ => {}
        }
    }
    if live != entry_count {
        return Err(invalid("entry count does not match the table"));
    }

    spans.sort_unstable_by_key(|&(start, _, _)| start);
    if spans.windows(2).any(|pair| pair[0].1 > pair[1].0) {
        return Err(invalid("entries overlap"));
    }
    spans.sort_unstable_by_key(|&(_, _, key)| key);
    if spans.windows(2).any(|pair| pair[0].2 == pair[1].2) {
        return Err(invalid("duplicate key"));
    }
    Ok(())
}

// ── Trait impls ──────────────────────────────────────────────────

impl<B: AsRef<[u8]>> fmt::Debug for Arena<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("buf_size", &self.buf_size())
            .field("buf_idx", &self.buf_idx())
            .field("table_size", &self.table_size())
            .field("entry_count", &self.entry_count())
            .finish()
    }
}

/// Arenas compare equal when their images are byte-identical.
impl<B: AsRef<[u8]>, C: AsRef<[u8]>> PartialEq<Arena<C>> for Arena<B> {
    fn eq(&self, other: &Arena<C>) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<B: AsRef<[u8]>> Eq for Arena<B> {}
