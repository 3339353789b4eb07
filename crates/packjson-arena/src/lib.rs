//! Single-buffer hash table arena for packjson.
//!
//! One contiguous byte buffer holds a header, an open-addressing entry
//! table, and the packed key and value bytes. Nested objects are complete
//! arenas embedded in their parent's content region.
//!
//! # Architecture
//!
//! ```text
//! Arena<B: AsRef<[u8]>>
//! ├── Header (buf_size, buf_idx, table_size, entry_count, parent link)
//! ├── Entry[table_size] (hash, key/value offsets, value size, type tag)
//! └── content: key\0 value key\0 value ...
//!     └── Object values are Arena images themselves
//! ```
//!
//! The engine never allocates and never grows the buffer on its own.
//! Capacity errors leave the arena untouched; the owner grows it with
//! [`Arena::replace_buffer`] or [`Arena::double_table`] and retries.
//! Rebuilds (delete, table doubling) borrow a [`ScratchRegion`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
mod embed;
mod growth;
pub mod layout;
mod probe;
pub mod scratch;
pub mod snapshot;
pub mod value;

pub use arena::{Arena, Entries, EntryRef, ObjectMut, ObjectRef, OwnedArena, ParentLink};
pub use packjson_core::{JsonError, ValueType};
pub use scratch::ScratchRegion;
pub use snapshot::OwnedValue;
pub use value::Value;
