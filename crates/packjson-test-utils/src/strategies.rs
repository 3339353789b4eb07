//! Proptest strategies for flat JSON objects.

use indexmap::IndexMap;
use packjson_arena::OwnedValue;
use proptest::prelude::*;

/// A scalar member value that survives a text round trip.
#[derive(Clone, Debug, PartialEq)]
pub enum FlatValue {
    Int(i32),
    Float(f32),
    Str(String),
}

impl FlatValue {
    /// JSON text for this value, as a hand-written document would have it.
    pub fn to_json(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Float(v) => format!("{v:.6}"),
            Self::Str(s) => format!("\"{s}\""),
        }
    }

    /// Whether `value` matches within the float printing precision.
    pub fn matches(&self, value: &OwnedValue) -> bool {
        match (self, value) {
            (Self::Int(a), OwnedValue::Int(b)) => a == b,
            (Self::Float(a), OwnedValue::Float(b)) => floats_close(*a, *b),
            (Self::Str(a), OwnedValue::Str(b)) => a == b,
            _ => false,
        }
    }
}

fn floats_close(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-4 * a.abs().max(1.0)
}

/// Whether two snapshots hold the same members, floats compared within
/// the printing precision. Member order is ignored at every level.
pub fn maps_close(a: &IndexMap<String, OwnedValue>, b: &IndexMap<String, OwnedValue>) -> bool {
    a.len() == b.len()
        && a.iter().all(|(key, left)| match (left, b.get(key)) {
            (OwnedValue::Float(x), Some(OwnedValue::Float(y))) => floats_close(*x, *y),
            (OwnedValue::Object(x), Some(OwnedValue::Object(y))) => maps_close(x, y),
            (left, Some(right)) => left == right,
            (_, None) => false,
        })
}

/// Keys without quotes, backslashes, or control bytes.
pub fn json_key() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,11}"
}

fn flat_value() -> impl Strategy<Value = FlatValue> {
    prop_oneof![
        any::<i32>().prop_map(FlatValue::Int),
        (-1.0e5f32..1.0e5f32).prop_map(FlatValue::Float),
        "[ -!#-\\[\\]-~]{0,24}".prop_map(FlatValue::Str),
    ]
}

/// Up to `max` members with distinct keys, in generation order.
pub fn flat_object(max: usize) -> impl Strategy<Value = IndexMap<String, FlatValue>> {
    proptest::collection::vec((json_key(), flat_value()), 0..=max)
        .prop_map(|members| members.into_iter().collect())
}

/// Compact JSON text for a flat object.
pub fn json_text(members: &IndexMap<String, FlatValue>) -> String {
    let body: Vec<String> = members
        .iter()
        .map(|(k, v)| format!("\"{k}\":{}", v.to_json()))
        .collect();
    format!("{{{}}}", body.join(","))
}
