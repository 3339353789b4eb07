//! Growth and relocation: table doubling, buffer replacement, delete, and
//! deep copy.
//!
//! Doubling and delete are full rebuilds: the image is copied into a
//! [`ScratchRegion`], the live buffer is re-laid out, and every surviving
//! entry is re-inserted in table order. Because stored locations are
//! offsets, moving an image to a new buffer needs no fix-up.

use packjson_core::{JsonError, ValueType};

use crate::arena::{Arena, ObjectRef};
use crate::layout::{write_u32, BUF_SIZE, ENTRY_SIZE, MAX_BUFFER_SIZE};
use crate::scratch::ScratchRegion;

impl<B: AsRef<[u8]>> Arena<B> {
    /// Byte-copy the image into `dest` and return an arena over it.
    ///
    /// `dest` must hold at least [`buf_size`](Self::buf_size) bytes; any
    /// bytes past that are zeroed. The copy keeps the source's `buf_size`
    /// and parent link.
    pub fn copy_into<D>(&self, mut dest: D) -> Result<Arena<D>, JsonError>
    where
        D: AsRef<[u8]> + AsMut<[u8]>,
    {
        let image = self.as_bytes();
        let out = dest.as_mut();
        if out.len() < image.len() {
            return Err(JsonError::BufferFull {
                requested: image.len(),
                available: out.len(),
            });
        }
        out[..image.len()].copy_from_slice(image);
        out[image.len()..].fill(0);
        Ok(Arena::from_raw(dest))
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Arena<B> {
    /// Double the table using a temporary scratch region.
    pub fn double_table(&mut self) -> Result<(), JsonError> {
        self.double_table_with(&mut ScratchRegion::default())
    }

    /// Double the number of table slots, rehashing every entry.
    ///
    /// The extra slots come out of free content space, so at least
    /// `table_size * ENTRY_SIZE` bytes must remain
    /// ([`JsonError::BufferFull`] otherwise).
    pub fn double_table_with(&mut self, scratch: &mut ScratchRegion) -> Result<(), JsonError> {
        let table_size = self.table_size();
        let new_table_size = table_size * 2;
        crate::arena::check_table_size(new_table_size)?;
        let requested = table_size * ENTRY_SIZE;
        let available = self.remaining();
        if requested > available {
            return Err(JsonError::BufferFull {
                requested,
                available,
            });
        }
        self.rebuild(scratch, new_table_size, None)
    }

    /// Delete using a temporary scratch region.
    pub fn delete(&mut self, key: &str) -> Result<(), JsonError> {
        self.delete_with(key, &mut ScratchRegion::default())
    }

    /// Remove `key` and compact the content region.
    pub fn delete_with(&mut self, key: &str, scratch: &mut ScratchRegion) -> Result<(), JsonError> {
        let slot = self.locate(key).ok_or(JsonError::NoMatchedKey)?;
        self.rebuild(scratch, self.table_size(), Some(slot))
    }

    /// Copy the image to scratch, lay out an empty table of `table_size`
    /// slots, then re-insert every entry except `skip`. If a re-insert
    /// fails the copy is written back, so the arena is left as it was.
    fn rebuild(
        &mut self,
        scratch: &mut ScratchRegion,
        table_size: usize,
        skip: Option<usize>,
    ) -> Result<(), JsonError> {
        scratch.reset();
        let copy = scratch.alloc(self.buf_size())?;
        copy.copy_from_slice(self.as_bytes());
        let copy = &*copy;

        let result = self.relayout(ObjectRef::view(copy), table_size, skip);
        if result.is_err() {
            self.raw_mut()[..copy.len()].copy_from_slice(copy);
        }
        scratch.reset();
        result
    }

    fn relayout(
        &mut self,
        snapshot: ObjectRef<'_>,
        table_size: usize,
        skip: Option<usize>,
    ) -> Result<(), JsonError> {
        self.format(table_size);
        for item in snapshot.entries() {
            if Some(item.slot()) == skip {
                continue;
            }
            let bytes = item.raw_value();
            let slot = self.insert_with(item.key_bytes(), item.value_type(), bytes.len(), |dst| {
                dst.copy_from_slice(bytes)
            })?;
            if item.value_type() == ValueType::Object {
                self.link_child(slot);
            }
        }
        Ok(())
    }

    /// Move the image into `new` and hand back the old buffer.
    ///
    /// `new` must hold at least [`buf_idx`](Self::buf_idx) bytes. It is
    /// zeroed, receives the used prefix of the image, and its full length
    /// becomes the new `buf_size`. Offsets are relative, so every key and
    /// value reads back unchanged.
    pub fn replace_buffer(&mut self, mut new: B) -> Result<B, JsonError> {
        let used = self.buf_idx();
        let out = new.as_mut();
        if out.len() < used {
            return Err(JsonError::BufferFull {
                requested: used,
                available: out.len(),
            });
        }
        if out.len() > MAX_BUFFER_SIZE {
            return Err(JsonError::generic(format!(
                "buffer of {} bytes exceeds the {MAX_BUFFER_SIZE} byte limit",
                out.len()
            )));
        }
        out.fill(0);
        out[..used].copy_from_slice(&self.raw()[..used]);
        let new_size = out.len();
        write_u32(out, BUF_SIZE, new_size as u32);
        Ok(std::mem::replace(self.storage_mut(), new))
    }
}
