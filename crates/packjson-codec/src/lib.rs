//! JSON text encode and decode over packjson arenas.
//!
//! Both directions work on the packed byte layout directly; there is no
//! intermediate tree. [`stringify`] walks the entry table, and [`parse`]
//! inserts members as it reads them, building nested objects in place.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod numeric;
pub mod parse;
pub mod stringify;

pub use numeric::{
    float_to_string, int_to_string, string_to_float, string_to_int, NumBuf, Parsed,
};
pub use parse::parse;
pub use stringify::{
    stringify, stringify_into, stringify_length, write_object, CountingSink, Sink, SliceSink,
};
