//! Canonical documents and prebuilt arenas.

use packjson_arena::OwnedArena;

/// Flat object with one float, one string, and one integer.
pub const SENSOR_JSON: &str =
    r#"{"sensor1":0.00468,"message":"JSON Is Cool","sensor2":-1423}"#;

/// Object with a nested child between two scalar members.
pub const NESTED_JSON: &str = r#"{"msg":"x","child":{"a":1},"n":2}"#;

/// Two levels of nesting with floats inside the child.
pub const DEEP_JSON: &str = r#"{"sensor1":0.04559,"message":"JSON Is Cool","Child":{"message":"JSON Child Ojbect","sensor3":0.56199},"sensor2":142}"#;

/// Keys used by the delete scenario, in insertion order.
pub const DELETE_KEYS: [&str; 5] = ["a", "i", "q", "TestJ", "TestH"];

/// Two distinct keys with the same hash.
pub const COLLIDING_KEYS: (&str, &str) = ("Nr5", "o5aa");

/// An owned arena, panicking on invalid sizes.
pub fn arena(buf_size: usize, table_size: usize) -> OwnedArena {
    OwnedArena::new(buf_size, table_size).expect("valid arena dimensions")
}

/// The delete scenario: five strings in an eight-slot table.
pub fn five_strings() -> OwnedArena {
    let mut a = arena(512, 8);
    for (key, value) in DELETE_KEYS
        .iter()
        .zip(["JSON", "IS", "Cool", "Should not appear", "Test Good?"])
    {
        a.insert_str(key, value).expect("fixture fits");
    }
    a
}

/// One member of every type, including a nested object.
pub fn mixed_arena() -> OwnedArena {
    let mut a = arena(1024, 8);
    a.insert_int("int", -68759).expect("fixture fits");
    a.insert_float("float", 0.5).expect("fixture fits");
    a.insert_str("str", "JSON").expect("fixture fits");
    a.insert_null("none").expect("fixture fits");
    let slot = a
        .insert_empty_object("child", 128, 2)
        .expect("fixture fits");
    a.object_mut_at(slot)
        .expect("slot holds an object")
        .insert_int("a", 1)
        .expect("fixture fits");
    a.trim_object(slot).expect("child is the last reservation");
    a
}
