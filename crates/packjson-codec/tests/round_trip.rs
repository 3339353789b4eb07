//! Text round trips through the packed layout.

use packjson_arena::{OwnedArena, OwnedValue};
use packjson_codec::{parse, stringify, stringify_length};
use packjson_test_utils::{
    arena, five_strings, flat_object, json_text, mixed_arena, DEEP_JSON, NESTED_JSON, SENSOR_JSON,
};
use proptest::prelude::*;

#[test]
fn sensor_document() {
    let mut a = arena(1024, 4);
    parse(&mut a, SENSOR_JSON).unwrap();
    let text = stringify(&a);
    assert_eq!(text.len(), stringify_length(&a));

    let mut b = arena(1024, 4);
    parse(&mut b, &text).unwrap();
    assert_eq!(b.get_str("message"), Some("JSON Is Cool"));
    assert_eq!(b.get_int("sensor2"), Some(-1423));
    let f = b.get_float("sensor1").unwrap();
    assert!((f - 0.00468).abs() < 1e-5);
}

#[test]
fn nested_document_round_trips() {
    let mut a = arena(1024, 4);
    assert_eq!(parse(&mut a, NESTED_JSON).unwrap(), NESTED_JSON.len());
    let text = stringify(&a);

    let mut b = arena(1024, 4);
    parse(&mut b, &text).unwrap();
    assert_eq!(b.to_owned_map(), a.to_owned_map());
    assert_eq!(text, r#"{"msg":"x","n":2,"child":{"a":1}}"#);
}

#[test]
fn deep_document_keeps_child_members() {
    let mut a = arena(1048, 4);
    parse(&mut a, DEEP_JSON).unwrap();
    let child = a.get_object("Child").unwrap();
    assert_eq!(child.get_str("message"), Some("JSON Child Ojbect"));
    assert!((child.get_float("sensor3").unwrap() - 0.56199).abs() < 1e-5);
    assert_eq!(a.get_int("sensor2"), Some(142));
}

#[test]
fn delete_scenario_serializes_survivors() {
    let mut a = five_strings();
    a.delete("TestJ").unwrap();
    let text = stringify(&a);
    for member in [
        r#""a":"JSON""#,
        r#""i":"IS""#,
        r#""q":"Cool""#,
        r#""TestH":"Test Good?""#,
    ] {
        assert!(text.contains(member), "{member} missing from {text}");
    }
    assert!(!text.contains("TestJ"));
}

#[test]
fn mixed_types_round_trip() {
    let a = mixed_arena();
    let text = stringify(&a);
    let mut b = arena(1024, 8);
    parse(&mut b, &text).unwrap();
    assert_eq!(b.to_owned_map(), a.to_owned_map());
}

#[test]
fn parse_into_embedded_child_view() {
    let mut a = arena(1024, 2);
    let slot = a.insert_empty_object("child", 256, 2).unwrap();
    let mut child = a.object_mut_at(slot).unwrap();
    parse(&mut child, r#"{"x":1,"y":"z"}"#).unwrap();
    a.trim_object(slot).unwrap();
    assert_eq!(stringify(&a), r#"{"child":{"y":"z","x":1}}"#);
}

#[test]
fn relocated_arena_serializes_identically() {
    let mut a = OwnedArena::new(512, 4).unwrap();
    parse(&mut a, NESTED_JSON).unwrap();
    let before = stringify(&a);
    a.replace_buffer(vec![0; 4096]).unwrap();
    assert_eq!(stringify(&a), before);
}

proptest! {
    #[test]
    fn flat_objects_round_trip(members in flat_object(12)) {
        let text = json_text(&members);
        let mut a = arena(4096, 16);
        prop_assert_eq!(parse(&mut a, &text).unwrap(), text.len());

        let mut b = arena(4096, 16);
        parse(&mut b, stringify(&a)).unwrap();
        let snapshot = b.to_owned_map();
        prop_assert_eq!(snapshot.len(), members.len());
        for (key, expected) in &members {
            let got = snapshot.get(key.as_str());
            prop_assert!(got.is_some_and(|v| expected.matches(v)), "{}: {:?} vs {:?}", key, expected, got);
        }
    }
}

#[test]
fn owned_values_compare_structurally() {
    let mut a = arena(1024, 4);
    parse(&mut a, NESTED_JSON).unwrap();
    match &a.to_owned_map()["child"] {
        OwnedValue::Object(child) => assert_eq!(child["a"], OwnedValue::Int(1)),
        other => panic!("child is {other:?}"),
    }
}
