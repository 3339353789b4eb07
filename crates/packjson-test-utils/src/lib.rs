//! Test fixtures and property-test strategies for packjson development.
//!
//! Provides canonical JSON documents, prebuilt arenas, and [`proptest`]
//! strategies for generating flat objects that survive a stringify/parse
//! round trip.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod strategies;

pub use fixtures::*;
pub use strategies::{flat_object, json_key, json_text, maps_close, FlatValue};
