//! packjson: JSON objects stored in one contiguous buffer.
//!
//! This is the facade crate that re-exports the public API of the packjson
//! sub-crates. An object is a header, an open-addressing hash table, and
//! packed key and value bytes, all inside a single caller-provided byte
//! buffer. Nested objects are complete images embedded in their parent.
//!
//! # Quick start
//!
//! ```rust
//! use packjson::prelude::*;
//!
//! // Fixed storage: the engine never allocates.
//! let mut obj = Arena::init(vec![0u8; 256], 4).unwrap();
//! parse(&mut obj, r#"{"sensor1":0.0456,"message":"JSON Is Cool","sensor2":142}"#).unwrap();
//! assert_eq!(obj.get_int("sensor2"), Some(142));
//! assert_eq!(obj.get_str("message"), Some("JSON Is Cool"));
//!
//! obj.insert_int("intInput", 999).unwrap();
//! assert!(stringify(&obj).contains(r#""intInput":999"#));
//!
//! // Growable storage: the store doubles the table and moves to a
//! // larger buffer when the engine runs out of room.
//! let mut store = JsonStore::new().unwrap();
//! for i in 0..32 {
//!     store.insert_int(&format!("k{i}"), i).unwrap();
//! }
//! assert_eq!(store.len(), 32);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `packjson-core` | `JsonError`, `ValueType`, key hash |
//! | [`arena`] | `packjson-arena` | Layout, table engine, growth, nesting |
//! | [`codec`] | `packjson-codec` | Parse, stringify, number conversions |
//! | [`store`] | `packjson-store` | Owned growable store and its config |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Error taxonomy, value type tags, and the key hash (`packjson-core`).
pub use packjson_core as types;

/// The packed layout and table engine (`packjson-arena`).
///
/// [`arena::Arena`] works over any byte storage; [`arena::OwnedArena`]
/// owns a `Vec<u8>`.
pub use packjson_arena as arena;

/// JSON text in and out (`packjson-codec`).
pub use packjson_codec as codec;

/// Growable ownership layer (`packjson-store`).
pub use packjson_store as store;

/// Common imports for typical packjson usage.
///
/// ```rust
/// use packjson::prelude::*;
/// ```
pub mod prelude {
    // Engine
    pub use packjson_arena::{
        Arena, ObjectMut, ObjectRef, OwnedArena, OwnedValue, ScratchRegion, Value,
    };

    // Core types
    pub use packjson_core::{JsonError, ValueType};

    // Codec
    pub use packjson_codec::{parse, stringify, stringify_into, stringify_length};

    // Store
    pub use packjson_store::{JsonStore, StoreConfig, StoreError};
}
