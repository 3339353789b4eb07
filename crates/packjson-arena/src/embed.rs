//! Nested objects.
//!
//! A nested object is a complete arena stored as the value bytes of a
//! parent slot. Its header carries a [`ParentLink`](crate::ParentLink)
//! back to that slot. The parser reserves all remaining parent space for
//! a child, fills it, then trims the reservation down to what the child
//! actually used.

use packjson_core::{JsonError, ValueType};

use crate::arena::{check_table_size, Arena, ObjectMut, ObjectRef};
use crate::layout::{self, Entry, BUF_IDX, BUF_SIZE, ENTRY_COUNT};

impl<B: AsRef<[u8]>> Arena<B> {
    /// The nested object stored under `key`.
    pub fn get_object(&self, key: &str) -> Option<ObjectRef<'_>> {
        self.object_at(self.locate(key)?)
    }

    /// The nested object in table slot `slot`.
    pub fn object_at(&self, slot: usize) -> Option<ObjectRef<'_>> {
        let entry = self.object_entry(slot)?;
        Some(ObjectRef::view(&self.raw()[entry.value_range()]))
    }

    fn object_entry(&self, slot: usize) -> Option<Entry> {
        if slot >= self.table_size() {
            return None;
        }
        let entry = self.entry(slot);
        (!entry.is_empty() && entry.value_type() == Some(ValueType::Object)).then_some(entry)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Arena<B> {
    /// Reserve `size` zeroed bytes under `key` as a `Null` value.
    pub fn reserve(&mut self, key: &str, size: usize) -> Result<usize, JsonError> {
        self.insert_with(key.as_bytes(), ValueType::Null, size, |_| {})
    }

    /// Reserve `size` bytes and initialise an empty child arena with
    /// `table_size` slots in them. Returns the slot.
    pub fn insert_empty_object(
        &mut self,
        key: &str,
        size: usize,
        table_size: usize,
    ) -> Result<usize, JsonError> {
        check_table_size(table_size)?;
        let required = layout::required_size(table_size);
        if size < required {
            return Err(JsonError::generic(format!(
                "object of {size} bytes cannot hold a table of {table_size} slots"
            )));
        }
        let slot = self.reserve(key, size)?;
        let range = self.entry(slot).value_range();
        Arena::init(&mut self.raw_mut()[range], table_size)?;
        self.link_child(slot);
        Ok(slot)
    }

    /// Copy `child` in as a nested object under `key`. Returns the slot.
    ///
    /// The stored copy is `child.buf_size()` bytes, slack included.
    pub fn insert_object<C: AsRef<[u8]>>(
        &mut self,
        key: &str,
        child: &Arena<C>,
    ) -> Result<usize, JsonError> {
        let image = child.as_bytes();
        let slot = self.insert_with(key.as_bytes(), ValueType::Null, image.len(), |dst| {
            dst.copy_from_slice(image)
        })?;
        self.link_child(slot);
        Ok(slot)
    }

    /// Mutable view of the nested object under `key`.
    pub fn get_object_mut(&mut self, key: &str) -> Option<ObjectMut<'_>> {
        let slot = self.locate(key)?;
        self.object_mut_at(slot)
    }

    /// Mutable view of the nested object in `slot`.
    pub fn object_mut_at(&mut self, slot: usize) -> Option<ObjectMut<'_>> {
        let entry = self.object_entry(slot)?;
        Some(ObjectMut::view_mut(&mut self.raw_mut()[entry.value_range()]))
    }

    /// Shrink the nested object in `slot` to the bytes it uses.
    ///
    /// Only the most recent reservation can be trimmed: its value must end
    /// at `buf_idx`. Returns the number of bytes handed back to the parent.
    pub fn trim_object(&mut self, slot: usize) -> Result<usize, JsonError> {
        let mut entry = self
            .object_entry(slot)
            .ok_or_else(|| JsonError::generic(format!("slot {slot} does not hold an object")))?;
        let range = entry.value_range();
        if range.end != self.buf_idx() {
            return Err(JsonError::generic(
                "only the most recent reservation can be trimmed",
            ));
        }
        let used = {
            let child = ObjectRef::view(&self.raw()[range.clone()]);
            child.buf_idx()
        };
        let tail = range.len() - used;
        let raw = self.raw_mut();
        layout::write_u32(&mut raw[range.clone()], BUF_SIZE, used as u32);
        raw[range.start + used..range.end].fill(0);
        entry.value_size = used as u32;
        entry.write(raw, slot);
        self.set_header(BUF_IDX, range.end - tail);
        Ok(tail)
    }

    /// Undo the most recent reservation entirely: the slot is emptied and
    /// its key and value bytes are handed back.
    pub fn release_reservation(&mut self, slot: usize) -> Result<(), JsonError> {
        if slot >= self.table_size() || self.entry(slot).is_empty() {
            return Err(JsonError::generic(format!("slot {slot} is empty")));
        }
        let entry = self.entry(slot);
        let end = entry.value_range().end;
        if end != self.buf_idx() {
            return Err(JsonError::generic(
                "only the most recent reservation can be released",
            ));
        }
        let start = entry.key_offset as usize;
        let count = self.entry_count();
        let raw = self.raw_mut();
        raw[start..end].fill(0);
        Entry::clear(raw, slot);
        self.set_header(BUF_IDX, start);
        self.set_header(ENTRY_COUNT, count - 1);
        Ok(())
    }
}
