//! Tests for JSON load/dump and serde integration

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sapling::*;
use serde_json::json;

#[test]
fn test_loads_builds_nodes() {
    let tree = loads(r#"{"name": "foo", "numbers": [1, 3, 5]}"#, Flags::default()).unwrap();
    assert!(tree.is_mapping());
    assert!(tree.at("numbers").unwrap().is_sequence());
    assert_eq!(tree.get_path([Index::from("numbers"), Index::from(1)]).unwrap(), 3);
}

#[test]
fn test_loads_scalar_document() {
    assert_eq!(loads("42", Flags::default()).unwrap(), 42);
    assert!(loads("null", Flags::default()).unwrap().is_null());
}

#[test]
fn test_load_from_reader() {
    let data = br#"[{"a": 1}, {"a": 2}]"#;
    let tree = load(&data[..], Flags::frozen()).unwrap();
    assert!(tree.is_frozen());
    assert!(tree.at(1).unwrap().is_frozen());
    assert_eq!(tree, json!([{"a": 1}, {"a": 2}]));
}

#[test]
fn test_dump_to_writer() {
    let tree = Value::from(json!({"a": [1, 2]}));
    let mut out = Vec::new();
    dump(&tree, &mut out, &DumpOptions::default()).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), r#"{"a":[1,2]}"#);
}

#[test]
fn test_dumps_pretty() {
    let tree = Value::from(json!({"a": [1]}));
    assert_eq!(
        dumps(&tree, &DumpOptions::pretty(4)).unwrap(),
        "{\n    \"a\": [\n        1\n    ]\n}"
    );
}

#[test]
fn test_built_tree_serializes_like_plain_data() {
    let tree = tree();
    tree.set("friends", json!([{"name": "David"}, {"name": "Celine"}]))
        .unwrap();
    tree.at("friends").unwrap().at(0).unwrap().set("age", 29).unwrap();
    tree.at("context").unwrap().set("city", "London").unwrap();
    tree.at("context").unwrap().set("country", "United Kingdom").unwrap();

    let data = to_json(&tree);
    assert_eq!(
        data,
        json!({
            "friends": [{"name": "David", "age": 29}, {"name": "Celine"}],
            "context": {"city": "London", "country": "United Kingdom"}
        })
    );
    assert_eq!(
        dumps(&tree, &DumpOptions::compact()).unwrap(),
        serde_json::to_string(&data).unwrap()
    );
}

#[test]
fn test_empty_tree_serializes_as_null() {
    assert_eq!(to_json(&tree()), serde_json::Value::Null);
    assert_eq!(dumps(&tree(), &DumpOptions::default()).unwrap(), "null");
}

#[test]
fn test_key_order_is_preserved() {
    let text = r#"{"zebra":1,"apple":2,"mango":3}"#;
    let tree = loads(text, Flags::default()).unwrap();
    assert_eq!(dumps(&tree, &DumpOptions::default()).unwrap(), text);
}

#[test]
fn test_serde_roundtrip_through_value() {
    let tree: Value = serde_json::from_value(json!({"a": [true, null, 1.5]})).unwrap();
    let back = serde_json::to_value(&tree).unwrap();
    assert_eq!(back, json!({"a": [true, null, 1.5]}));
}

#[test]
fn test_io_error_is_wrapped() {
    struct Broken;

    impl std::io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "broken pipe"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let err = dump(&Value::from(json!([1])), Broken, &DumpOptions::default()).unwrap_err();
    assert!(matches!(err, TreeError::Json(_) | TreeError::Io(_)));
}

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-4000i32..4000).prop_map(|n| json!(f64::from(n) / 4.0)),
        "[a-z]{0,8}".prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..6)
                .prop_map(|entries| serde_json::Value::Object(entries.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_dumps_loads_roundtrip(data in arb_json()) {
        let text = serde_json::to_string(&data).unwrap();
        let tree = loads(&text, Flags::default()).unwrap();
        prop_assert_eq!(dumps(&tree, &DumpOptions::default()).unwrap(), text);
        prop_assert_eq!(to_json(&tree), data);
    }
}
