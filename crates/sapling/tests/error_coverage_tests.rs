// Comprehensive coverage tests for error module
use sapling::error::type_name;
use sapling::*;
use serde_json::json;

// ═══════════════════════════════════════════════════════════════════════
// type_name Coverage - All Value Types
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_type_name_scalars() {
    assert_eq!(type_name(&Value::Null), "null");
    assert_eq!(type_name(&Value::Bool(true)), "bool");
    assert_eq!(type_name(&Value::Int(0)), "int");
    assert_eq!(type_name(&Value::Float(0.5)), "float");
    assert_eq!(type_name(&Value::from("s")), "string");
}

#[test]
fn test_type_name_nodes() {
    assert_eq!(type_name(&Value::mapping()), "mapping");
    assert_eq!(type_name(&Value::sequence()), "sequence");
}

#[test]
fn test_type_name_undefined_follows_resolution() {
    let root = Value::mapping();
    let pending = root.at("items").unwrap();
    assert_eq!(type_name(&pending), "undefined");

    pending.append(1).unwrap();
    assert_eq!(type_name(&pending), "sequence");
}

// ═══════════════════════════════════════════════════════════════════════
// TreeError Coverage
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_shape_conflict_message() {
    let list = Value::from(json!([1]));
    let err = list.at("name").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Shape conflict"));
    assert!(msg.contains("sequence"));
}

#[test]
fn test_ambiguous_message() {
    let err = tree().at(0).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Ambiguous"));
    assert!(msg.contains("at 0"));
}

#[test]
fn test_ambiguous_slice_message() {
    let err = tree().at(1..3).unwrap_err();
    assert!(err.to_string().contains("1:3"));
}

#[test]
fn test_locked_message() {
    let t = loads(r#"{"a": 1}"#, Flags::sealed()).unwrap();
    let err = t.set("b", 2).unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"Policy violation: cannot add key "b" to a sealed mapping node"#
    );
}

#[test]
fn test_key_not_found_message() {
    let m = Mapping::new();
    let err = m.pop("ghost").unwrap_err();
    assert_eq!(err.to_string(), "Key not found: ghost");
}

#[test]
fn test_locked_key_not_found_message() {
    let t = loads("{}", Flags::frozen()).unwrap();
    let err = t.at("ghost").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("ghost"));
    assert!(msg.contains("frozen"));
}

#[test]
fn test_index_out_of_range_message() {
    let s = Value::from(json!([1, 2]));
    let err = s.at(5).unwrap_err();
    assert_eq!(err.to_string(), "Index out of range: index 5 for length 2");
}

#[test]
fn test_value_not_found() {
    let s = Sequence::from_values([1], Flags::default());
    let err = s.remove("x").unwrap_err();
    assert!(matches!(err, TreeError::ValueNotFound(_)));
    assert!(err.to_string().contains("\"x\""));
}

#[test]
fn test_invalid_arguments() {
    let s = Value::sequence();
    let err = s
        .append_args(
            vec![Value::Int(1)],
            vec![("k".to_string(), Value::Int(2))],
        )
        .unwrap_err();
    assert!(matches!(err, TreeError::InvalidArguments(_)));
    assert!(err.to_string().starts_with("Invalid arguments"));
}

#[test]
fn test_type_error_message() {
    let err = freeze(&Value::from("text")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Type error: expected mapping or sequence, got string"
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Error From Conversion
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_tree_error_from_json_error() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: TreeError = json_err.into();
    assert!(matches!(err, TreeError::Json(_)));
    assert!(err.to_string().starts_with("JSON error"));
}

#[test]
fn test_tree_error_from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: TreeError = io_err.into();
    assert!(matches!(err, TreeError::Io(_)));
}

#[test]
fn test_errors_propagate_with_anyhow() -> anyhow::Result<()> {
    let root = tree();
    root.at("a")?.at("b")?.set("c", 1)?;
    let text = dumps(&root, &DumpOptions::default())?;
    assert_eq!(text, r#"{"a":{"b":{"c":1}}}"#);
    Ok(())
}
