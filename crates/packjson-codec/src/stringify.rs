//! JSON text output straight from the packed layout.
//!
//! One emitter walks the table in slot order and writes into a [`Sink`].
//! The same walk runs against a counting sink to size the output and
//! against a slice or `Vec` sink to produce it, so the two can never
//! disagree.

use packjson_arena::{Arena, Value};
use packjson_core::JsonError;

use crate::numeric::{float_to_string, int_to_string};

/// Destination for emitted JSON bytes.
pub trait Sink {
    /// Append `bytes`.
    fn put(&mut self, bytes: &[u8]) -> Result<(), JsonError>;

    /// Drop the last `n` bytes written.
    fn retract(&mut self, n: usize);
}

/// Counts bytes without storing them.
#[derive(Clone, Copy, Debug, Default)]
pub struct CountingSink {
    len: usize,
}

impl CountingSink {
    /// Bytes counted so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Sink for CountingSink {
    fn put(&mut self, bytes: &[u8]) -> Result<(), JsonError> {
        self.len += bytes.len();
        Ok(())
    }

    fn retract(&mut self, n: usize) {
        self.len -= n;
    }
}

/// Writes into a fixed slice.
#[derive(Debug)]
pub struct SliceSink<'a> {
    out: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceSink<'a> {
    /// Start writing at the beginning of `out`.
    pub fn new(out: &'a mut [u8]) -> Self {
        Self { out, pos: 0 }
    }

    /// Bytes written so far.
    pub fn written(&self) -> usize {
        self.pos
    }
}

impl Sink for SliceSink<'_> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), JsonError> {
        let available = self.out.len() - self.pos;
        if bytes.len() > available {
            return Err(JsonError::BufferFull {
                requested: bytes.len(),
                available,
            });
        }
        self.out[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    fn retract(&mut self, n: usize) {
        self.pos -= n;
    }
}

impl Sink for Vec<u8> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), JsonError> {
        self.extend_from_slice(bytes);
        Ok(())
    }

    fn retract(&mut self, n: usize) {
        self.truncate(self.len() - n);
    }
}

/// Emit `obj` as compact JSON into `sink`.
///
/// Members appear in table order as `"key":value`. Strings are written
/// as stored, without escaping.
pub fn write_object<B, S>(obj: &Arena<B>, sink: &mut S) -> Result<(), JsonError>
where
    B: AsRef<[u8]>,
    S: Sink + ?Sized,
{
    sink.put(b"{")?;
    let mut any = false;
    for entry in obj.entries() {
        any = true;
        sink.put(b"\"")?;
        sink.put(entry.key_bytes())?;
        sink.put(b"\":")?;
        match entry.value() {
            Value::Int(v) => sink.put(&int_to_string(v, 10))?,
            Value::Float(v) => sink.put(&float_to_string(v))?,
            Value::Str(s) => {
                sink.put(b"\"")?;
                sink.put(s.as_bytes())?;
                sink.put(b"\"")?;
            }
            Value::Object(child) => write_object(&child, sink)?,
            Value::Null => sink.put(b"null")?,
        }
        sink.put(b",")?;
    }
    if any {
        sink.retract(1);
    }
    sink.put(b"}")
}

/// Exact length of the JSON text for `obj`.
pub fn stringify_length<B: AsRef<[u8]>>(obj: &Arena<B>) -> usize {
    let mut counter = CountingSink::default();
    // Counting never fails.
    let _ = write_object(obj, &mut counter);
    counter.len()
}

/// Write the JSON text for `obj` into `dest`. Returns the length.
///
/// Fails with [`JsonError::BufferFull`] before writing anything if `dest`
/// is too short.
pub fn stringify_into<B: AsRef<[u8]>>(obj: &Arena<B>, dest: &mut [u8]) -> Result<usize, JsonError> {
    let len = stringify_length(obj);
    if len > dest.len() {
        return Err(JsonError::BufferFull {
            requested: len,
            available: dest.len(),
        });
    }
    let mut sink = SliceSink::new(dest);
    write_object(obj, &mut sink)?;
    Ok(sink.written())
}

/// The JSON text for `obj` as a `String`.
pub fn stringify<B: AsRef<[u8]>>(obj: &Arena<B>) -> String {
    let mut out = Vec::with_capacity(stringify_length(obj));
    // Vec sinks never fail.
    let _ = write_object(obj, &mut out);
    match String::from_utf8(out) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packjson_arena::OwnedArena;

    #[test]
    fn empty_object() {
        let a = OwnedArena::new(128, 2).unwrap();
        assert_eq!(stringify(&a), "{}");
        assert_eq!(stringify_length(&a), 2);
    }

    #[test]
    fn single_members_of_each_type() {
        let mut a = OwnedArena::new(128, 1).unwrap();
        a.insert_int("i", -68759).unwrap();
        assert_eq!(stringify(&a), r#"{"i":-68759}"#);

        let mut a = OwnedArena::new(128, 1).unwrap();
        a.insert_float("f", 0.5).unwrap();
        assert_eq!(stringify(&a), r#"{"f":0.5}"#);

        let mut a = OwnedArena::new(128, 1).unwrap();
        a.insert_str("s", "JSON Is Cool").unwrap();
        assert_eq!(stringify(&a), r#"{"s":"JSON Is Cool"}"#);

        let mut a = OwnedArena::new(128, 1).unwrap();
        a.insert_null("n").unwrap();
        assert_eq!(stringify(&a), r#"{"n":null}"#);
    }

    #[test]
    fn nested_object_and_length_agree() {
        let mut a = OwnedArena::new(512, 2).unwrap();
        a.insert_int("n", 2).unwrap();
        let slot = a.insert_empty_object("child", 128, 1).unwrap();
        a.object_mut_at(slot).unwrap().insert_int("a", 1).unwrap();

        let text = stringify(&a);
        assert!(text.contains(r#""child":{"a":1}"#));
        assert!(text.contains(r#""n":2"#));
        assert_eq!(text.len(), stringify_length(&a));
        assert!(text.starts_with('{') && text.ends_with('}'));
        assert!(!text.contains(",}"));
    }

    #[test]
    fn stringify_into_checks_space() {
        let mut a = OwnedArena::new(128, 1).unwrap();
        a.insert_int("k", 10).unwrap();
        let mut small = [0u8; 5];
        assert_eq!(
            stringify_into(&a, &mut small).unwrap_err(),
            JsonError::BufferFull {
                requested: 8,
                available: 5
            }
        );
        let mut exact = [0u8; 8];
        assert_eq!(stringify_into(&a, &mut exact).unwrap(), 8);
        assert_eq!(&exact, br#"{"k":10}"#);
    }

    #[test]
    fn slice_sink_reports_overflow() {
        let mut buf = [0u8; 2];
        let mut sink = SliceSink::new(&mut buf);
        sink.put(b"ab").unwrap();
        assert!(sink.put(b"c").is_err());
        sink.retract(1);
        sink.put(b"c").unwrap();
        assert_eq!(&buf, b"ac");
    }
}
