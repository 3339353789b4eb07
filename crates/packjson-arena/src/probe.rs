//! Open-addressing probe sequence.

use crate::layout::{PERTURB_DRAIN, PERTURB_SHIFT};

/// Slot indices visited when looking for `hash` in a table of
/// `table_size` slots.
///
/// Starts at `hash & mask`, then steps with
/// `idx = (5 * idx + 1 + perturb) & mask; perturb >>= 5`. The perturbation
/// is the hash reinterpreted as unsigned so the shift is logical and always
/// drains to zero. The sequence is bounded so a full table of non-matching
/// keys terminates.
#[derive(Clone, Debug)]
pub(crate) struct Probe {
    idx: u32,
    perturb: u32,
    mask: u32,
    remaining: usize,
}

impl Probe {
    pub(crate) fn new(hash: i32, table_size: usize) -> Self {
        let mask = (table_size as u32).wrapping_sub(1);
        Self {
            idx: hash as u32 & mask,
            perturb: hash as u32,
            mask,
            remaining: table_size + PERTURB_DRAIN,
        }
    }
}

impl Iterator for Probe {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.idx;
        self.idx = self
            .idx
            .wrapping_mul(5)
            .wrapping_add(1)
            .wrapping_add(self.perturb)
            & self.mask;
        self.perturb >>= PERTURB_SHIFT;
        Some(current as usize)
    }
}
