//! End-to-end store scenarios: mixed inserts and sets, parse and
//! stringify, nested objects, and growth from a tiny start.

use std::collections::BTreeMap;

use packjson_arena::{JsonError, OwnedValue};
use packjson_store::{JsonStore, StoreConfig, StoreError};
use packjson_test_utils::fixtures::{arena, DEEP_JSON, DELETE_KEYS, SENSOR_JSON};
use packjson_test_utils::strategies::maps_close;
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn tiny() -> JsonStore {
    JsonStore::with_config(StoreConfig {
        initial_buffer_size: 128,
        initial_table_size: 2,
        ..StoreConfig::default()
    })
    .unwrap()
}

// ── Mixed workload ──────────────────────────────────────────────

#[test]
fn strings_then_clear_then_mixed_types() {
    init_tracing();
    let mut store = tiny();
    for (key, value) in DELETE_KEYS
        .iter()
        .zip(["JSON", "IS", "Cool", "Should not appear", "Test Good?"])
    {
        store.insert_str(key, value).unwrap();
    }
    store.delete("TestJ").unwrap();
    let text = store.stringify();
    assert_eq!(text.len(), store.stringify_length());
    assert!(!text.contains("TestJ"));

    store.insert_str("TestI", "Really??").unwrap();
    store.insert_str("TestK", "Really? again???").unwrap();
    assert_eq!(store.get_str("TestI"), Some("Really??"));
    assert_eq!(store.get_str("TestK"), Some("Really? again???"));
    assert_eq!(store.get_str("TestJ"), None);

    store.clear();
    for key in ["a", "i", "q", "TestH", "TestI", "TestJ", "TestK"] {
        assert_eq!(store.get_str(key), None);
    }

    store.insert_float("float1", 4.9).unwrap();
    store.insert_float("float2", 0.023).unwrap();
    store.set_float("float2", 999.999).unwrap();
    store.insert_float("float3", -0.00911).unwrap();
    store.insert_str("a", "JSON").unwrap();
    store.insert_str("i", "IS").unwrap();
    store.set_str("i", "IS...!!~~!~!~!~!~!!~!!!?").unwrap();
    store.insert_str("q", "Cool").unwrap();
    store.insert_int("int1", 654).unwrap();
    store.set_int("int1", 85989).unwrap();
    store.insert_int("int2", 17).unwrap();
    store.insert_int("int3", -68759).unwrap();

    assert_eq!(store.get_float("float1"), Some(4.9));
    assert_eq!(store.get_float("float2"), Some(999.999));
    assert_eq!(store.get_float("float3"), Some(-0.00911));
    assert_eq!(store.get_str("a"), Some("JSON"));
    assert_eq!(store.get_str("i"), Some("IS...!!~~!~!~!~!~!!~!!!?"));
    assert_eq!(store.get_str("q"), Some("Cool"));
    assert_eq!(store.get_int("int1"), Some(85989));
    assert_eq!(store.get_int("int2"), Some(17));
    assert_eq!(store.get_int("int3"), Some(-68759));

    assert_eq!(store.get_int("int?3"), None);
    assert_eq!(store.get_float("str??3"), None);
    assert_eq!(store.get_str("3int?"), None);
    assert_eq!(store.get_str("int1"), None);

    let text = store.stringify();
    for fragment in [
        r#""float1":4.9"#,
        r#""float2":999.99902"#,
        r#""float3":-0.0091"#,
        r#""i":"IS...!!~~!~!~!~!~!!~!!!?""#,
        r#""int1":85989"#,
        r#""int3":-68759"#,
    ] {
        assert!(text.contains(fragment), "{fragment} missing from {text}");
    }
}

// ── Parse and stringify ─────────────────────────────────────────

#[test]
fn parse_sensor_document() {
    init_tracing();
    let mut store = tiny();
    store.parse(SENSOR_JSON).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.get_str("message"), Some("JSON Is Cool"));
    assert_eq!(store.get_int("sensor2"), Some(-1423));
    let sensor1 = store.get_float("sensor1").unwrap();
    assert!((sensor1 - 0.00468).abs() < 1e-7);

    store.insert_int("intInput", 999).unwrap();
    let text = store.stringify();
    assert!(text.contains(r#""intInput":999"#));

    let mut out = vec![0u8; store.stringify_length()];
    assert_eq!(store.stringify_into(&mut out).unwrap(), out.len());
    assert_eq!(out, text.as_bytes());

    let mut short = vec![0u8; 4];
    assert!(matches!(
        store.stringify_into(&mut short),
        Err(StoreError::Json(JsonError::BufferFull { .. }))
    ));
}

#[test]
fn parse_nested_document_from_a_tiny_store() {
    init_tracing();
    let mut store = tiny();
    store.parse(DEEP_JSON).unwrap();

    assert_eq!(store.get_int("sensor2"), Some(142));
    let child = store.get_object("Child").unwrap();
    assert_eq!(child.get_str("message"), Some("JSON Child Ojbect"));
    assert_eq!(child.get_float("sensor3"), Some(0.56199));

    let text = store.stringify();
    assert!(text.contains(r#""sensor3":0.56199"#));
    assert!(text.contains(r#""sensor1":0.04558"#));

    // Printing truncates floats, so the reparsed values drift in the
    // last digit.
    let mut again = JsonStore::new().unwrap();
    again.parse(&text).unwrap();
    let (before, after) = (store.to_owned_map(), again.to_owned_map());
    assert!(maps_close(&before, &after), "{before:?} vs {after:?}");
    assert_ne!(after.get("sensor1"), before.get("sensor1"));
    assert_eq!(after.get("sensor2"), Some(&OwnedValue::Int(142)));
}

#[test]
fn insert_parsed_child_object() {
    let mut parent = JsonStore::new().unwrap();
    parent
        .parse(r#"{"sensor1":0.045600,"message":"JSON Is Cool","sensor2":142}"#)
        .unwrap();

    let mut child = arena(200, 2);
    packjson_codec::parse(&mut child, r#"{"message":"JSON Child Ojbect","sensor3":0.562}"#)
        .unwrap();
    parent.insert_object("Child", &child).unwrap();

    let view = parent.get_object("Child").unwrap();
    assert_eq!(view.get_str("message"), Some("JSON Child Ojbect"));
    let link = view.parent_link().unwrap();
    assert_eq!(link.entry_index, parent.as_arena().locate("Child").unwrap());

    match parent.to_owned_map().get("Child") {
        Some(OwnedValue::Object(members)) => assert_eq!(members.len(), 2),
        other => panic!("expected object, got {other:?}"),
    }
}

// ── Nested objects through the store ────────────────────────────

#[test]
fn fill_a_reserved_child_in_place() {
    let mut store = tiny();
    store.insert_empty_object("child", 96, 2).unwrap();
    {
        let mut child = store.get_object_mut("child").unwrap();
        child.insert_int("x", 1).unwrap();
        child.insert_str("y", "z").unwrap();
    }
    store.insert_int("after", 3).unwrap();
    let child = store.get_object("child").unwrap();
    assert_eq!(child.get_int("x"), Some(1));
    assert_eq!(child.get_str("y"), Some("z"));
    assert_eq!(store.get_int("after"), Some(3));
}

// ── Model check ─────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum Op {
    Insert(String, String),
    Set(String, String),
    Delete(String),
}

fn op() -> impl Strategy<Value = Op> {
    let key = "[a-h]{1,3}";
    let value = "[ -~&&[^\"]]{0,40}";
    prop_oneof![
        (key, value).prop_map(|(k, v)| Op::Insert(k, v)),
        (key, value).prop_map(|(k, v)| Op::Set(k, v)),
        key.prop_map(Op::Delete),
    ]
}

proptest! {
    #[test]
    fn store_matches_a_map(ops in proptest::collection::vec(op(), 1..80)) {
        let mut store = tiny();
        let mut model = BTreeMap::new();
        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let result = store.insert_str(&k, &v);
                    if model.contains_key(&k) {
                        prop_assert_eq!(result, Err(StoreError::Json(JsonError::KeyExists)));
                    } else {
                        prop_assert!(result.is_ok());
                        model.insert(k, v);
                    }
                }
                Op::Set(k, v) => {
                    let result = store.set_str(&k, &v);
                    match model.get_mut(&k) {
                        Some(slot) => {
                            prop_assert!(result.is_ok());
                            *slot = v;
                        }
                        None => prop_assert_eq!(result, Err(StoreError::Json(JsonError::NoMatchedKey))),
                    }
                }
                Op::Delete(k) => {
                    prop_assert_eq!(store.delete(&k).is_ok(), model.remove(&k).is_some());
                }
            }
        }
        prop_assert_eq!(store.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(store.get_str(k), Some(v.as_str()));
        }

        let mut reparsed = tiny();
        reparsed.parse(store.stringify()).unwrap();
        prop_assert_eq!(reparsed.to_owned_map(), store.to_owned_map());
    }
}
