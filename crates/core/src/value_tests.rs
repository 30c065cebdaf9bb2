// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    null    = { Value::Null, false },
    false_  = { Value::Bool(false), false },
    true_   = { Value::Bool(true), true },
    zero    = { Value::Int(0), false },
    nonzero = { Value::Int(7), true },
    zero_f  = { Value::Float(0.0), false },
    empty_s = { Value::Str(String::new()), false },
    some_s  = { Value::from("x"), true },
    empty_l = { Value::List(vec![]), false },
    some_l  = { Value::List(vec![Value::Int(1)]), true },
)]
fn truthiness(value: Value, expected: bool) {
    assert_eq!(value.is_truthy(), expected);
}

#[test]
fn render_string_scalars() {
    assert_eq!(Value::Null.render_string(), "null");
    assert_eq!(Value::Bool(true).render_string(), "true");
    assert_eq!(Value::Int(-3).render_string(), "-3");
    assert_eq!(Value::from("plain text").render_string(), "plain text");
}

#[test]
fn render_string_list_is_compact_json() {
    let v = Value::List(vec![Value::Int(1), Value::from("a")]);
    assert_eq!(v.render_string(), r#"[1,"a"]"#);
}

#[test]
fn render_string_map_preserves_insertion_order() {
    let mut m = indexmap::IndexMap::new();
    m.insert("z".to_string(), Value::Int(1));
    m.insert("a".to_string(), Value::Int(2));
    assert_eq!(Value::Map(m).render_string(), r#"{"z":1,"a":2}"#);
}

#[test]
fn json_round_trip() {
    let json = r#"{"name":"x","count":3,"ratio":0.5,"on":true,"none":null,"items":[1,2]}"#;
    let v: Value = serde_json::from_str(json).unwrap();
    let m = v.as_map().unwrap();
    assert_eq!(m.get("count"), Some(&Value::Int(3)));
    assert_eq!(m.get("ratio"), Some(&Value::Float(0.5)));
    assert_eq!(m.get("none"), Some(&Value::Null));
    let back = serde_json::to_string(&v).unwrap();
    let reparsed: Value = serde_json::from_str(&back).unwrap();
    assert_eq!(v, reparsed);
}

#[test]
fn integers_deserialize_as_int_not_float() {
    let v: Value = serde_json::from_str("42").unwrap();
    assert_eq!(v, Value::Int(42));
    assert_eq!(v.type_name(), "int");
}
