//! Benchmark workloads for packjson.
//!
//! - [`member_keys`]: deterministic key set of a given size
//! - [`flat_document`]: JSON text with a mix of ints, floats, and strings
//! - [`filled_arena`]: an arena already holding [`flat_document`]'s members

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::fmt::Write;

use packjson_arena::layout::{content_start, string_slot_size};
use packjson_arena::OwnedArena;

/// `n` distinct keys: `m0`, `m1`, ...
pub fn member_keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("m{i}")).collect()
}

/// Smallest power-of-two table that holds `n` members.
pub fn table_for(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// A flat object with `n` members cycling int, float, string.
pub fn flat_document(n: usize) -> String {
    let mut text = String::from("{");
    for (i, key) in member_keys(n).iter().enumerate() {
        if i > 0 {
            text.push(',');
        }
        let _ = match i % 3 {
            0 => write!(text, "\"{key}\":{}", i as i32 * 37 - 500),
            1 => write!(text, "\"{key}\":{}.{:02}", i, i % 100),
            _ => write!(text, "\"{key}\":\"value number {i}\""),
        };
    }
    text.push('}');
    text
}

/// An arena sized for and filled with [`flat_document`]`(n)`'s members.
pub fn filled_arena(n: usize) -> OwnedArena {
    let keys = member_keys(n);
    let content: usize = keys
        .iter()
        .map(|k| k.len() + 1 + string_slot_size(24))
        .sum();
    let table = table_for(n);
    let mut arena =
        OwnedArena::new(content_start(table) + content, table).expect("benchmark arena");
    for (i, key) in keys.iter().enumerate() {
        match i % 3 {
            0 => arena.insert_int(key, i as i32 * 37 - 500),
            1 => arena.insert_float(key, i as f32 + (i % 100) as f32 / 100.0),
            _ => arena.insert_str(key, &format!("value number {i}")),
        }
        .expect("sized for every member");
    }
    arena
}
