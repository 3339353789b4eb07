//! Reusable scratch space for rebuild operations.
//!
//! [`ScratchRegion`] is a bump allocator over a `Vec<u8>`. Table doubling
//! and delete copy the arena image into scratch before rebuilding the live
//! buffer from it. The backing allocation is reused across calls, and an
//! optional byte limit bounds how far it may grow.

use packjson_core::JsonError;

/// Bump-allocated scratch bytes for arena rebuilds.
///
/// Each rebuild resets the region before allocating, so allocations do not
/// persist across operations.
#[derive(Debug, Default)]
pub struct ScratchRegion {
    /// Backing storage. Grows on demand, never shrinks.
    data: Vec<u8>,
    /// Current bump pointer in bytes.
    cursor: usize,
    /// Upper bound on `data.len()`, if any.
    limit: Option<usize>,
}

impl ScratchRegion {
    /// Create an unbounded scratch region with the given initial capacity in bytes.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            data: vec![0; initial_capacity],
            cursor: 0,
            limit: None,
        }
    }

    /// Create a scratch region that never grows beyond `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            cursor: 0,
            limit: Some(limit),
        }
    }

    /// Allocate `len` zeroed bytes.
    ///
    /// Returns [`JsonError::ScratchExhausted`] if the allocation would take
    /// the region past its limit.
    pub fn alloc(&mut self, len: usize) -> Result<&mut [u8], JsonError> {
        let limit = self.limit;
        let exhausted = || JsonError::ScratchExhausted {
            requested: len,
            limit: limit.unwrap_or(usize::MAX),
        };
        let new_cursor = self.cursor.checked_add(len).ok_or_else(exhausted)?;
        if new_cursor > self.data.len() {
            let doubled = self
                .data
                .len()
                .max(256)
                .max(new_cursor)
                .checked_mul(2)
                .unwrap_or(new_cursor);
            let new_cap = match limit {
                Some(limit) if new_cursor > limit => return Err(exhausted()),
                Some(limit) => doubled.min(limit),
                None => doubled,
            };
            self.data.resize(new_cap, 0);
        }
        let start = self.cursor;
        self.cursor = new_cursor;
        // Earlier rebuilds may have left bytes behind.
        let slice = &mut self.data[start..new_cursor];
        slice.fill(0);
        Ok(slice)
    }

    /// Forget every allocation. The backing storage is kept.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Bytes currently allocated.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Size of the backing storage in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The configured byte limit, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
