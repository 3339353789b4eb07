//! Owned, growable JSON objects on top of the packjson arena.
//!
//! The arena engine and codec never allocate; they report
//! [`JsonError::TableFull`](packjson_core::JsonError::TableFull) and
//! [`JsonError::BufferFull`](packjson_core::JsonError::BufferFull) and
//! leave growth to the owner. [`JsonStore`] is that owner: it holds a
//! heap buffer, doubles the table or moves to a larger buffer when the
//! engine asks, and retries.
//!
//! Growth and rebuilds are logged through `tracing` at `debug` and
//! `trace` level; hitting the configured buffer cap logs a `warn`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod store;

pub use config::{ConfigError, StoreConfig};
pub use error::StoreError;
pub use store::JsonStore;
