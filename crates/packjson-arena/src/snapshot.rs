//! Owned copies of arena contents for inspection and comparison.

use indexmap::IndexMap;

use crate::arena::Arena;
use crate::value::Value;

/// An owned value tree.
#[derive(Clone, Debug, PartialEq)]
pub enum OwnedValue {
    /// 32-bit signed integer.
    Int(i32),
    /// Single-precision float.
    Float(f32),
    /// Text.
    Str(String),
    /// Nested object, members in table order.
    Object(IndexMap<String, OwnedValue>),
    /// `null`.
    Null,
}

impl From<Value<'_>> for OwnedValue {
    fn from(value: Value<'_>) -> Self {
        match value {
            Value::Int(v) => Self::Int(v),
            Value::Float(v) => Self::Float(v),
            Value::Str(v) => Self::Str(v.to_owned()),
            Value::Object(obj) => Self::Object(obj.to_owned_map()),
            Value::Null => Self::Null,
        }
    }
}

impl<B: AsRef<[u8]>> Arena<B> {
    /// Copy every entry out, in table order, recursing into nested objects.
    pub fn to_owned_map(&self) -> IndexMap<String, OwnedValue> {
        self.entries()
            .map(|e| (e.key().to_owned(), OwnedValue::from(e.value())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::OwnedArena;

    #[test]
    fn snapshot_recurses() {
        let mut a = OwnedArena::new(512, 4).unwrap();
        a.insert_str("msg", "x").unwrap();
        let slot = a.insert_empty_object("child", 128, 1).unwrap();
        a.object_mut_at(slot).unwrap().insert_int("a", 1).unwrap();
        a.insert_null("n").unwrap();

        let map = a.to_owned_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map["msg"], OwnedValue::Str("x".into()));
        assert_eq!(map["n"], OwnedValue::Null);
        let OwnedValue::Object(child) = &map["child"] else {
            panic!("child is not an object");
        };
        assert_eq!(child["a"], OwnedValue::Int(1));
    }

    #[test]
    fn snapshot_order_matches_entries() {
        let mut a = OwnedArena::new(512, 8).unwrap();
        for key in ["q", "TestJ", "a", "i", "TestH"] {
            a.insert_int(key, 0).unwrap();
        }
        let keys: Vec<&str> = a.entries().map(|e| e.key()).collect();
        let snapshot = a.to_owned_map();
        let snap_keys: Vec<&str> = snapshot.keys().map(String::as_str).collect();
        assert_eq!(keys, snap_keys);
    }
}
