//! Core types for the packjson object store.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! pieces every other crate agrees on: the key hash, the value type tags
//! stored in the entry table, and the error taxonomy returned by the
//! table engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod hash;
pub mod value;

pub use error::JsonError;
pub use hash::key_hash;
pub use value::ValueType;
