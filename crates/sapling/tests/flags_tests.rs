//! Tests for sealed and frozen trees

use pretty_assertions::assert_eq;
use sapling::*;
use serde_json::json;

fn sealed_tree(data: serde_json::Value) -> Value {
    loads(&data.to_string(), Flags::sealed()).unwrap()
}

fn frozen_tree(data: serde_json::Value) -> Value {
    loads(&data.to_string(), Flags::frozen()).unwrap()
}

fn is_locked(err: &TreeError, expected: Lock) -> bool {
    matches!(err, TreeError::Locked { lock, .. } if *lock == expected)
}

// ═══════════════════════════════════════════════════════════════════════
// Sealed
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_sealed_allows_overwrite_blocks_new_keys() {
    let t = sealed_tree(json!({"city": "NY"}));
    t.set("city", "LA").unwrap();
    assert_eq!(t.at("city").unwrap(), "LA");

    let err = t.set("country", "US").unwrap_err();
    assert!(is_locked(&err, Lock::Sealed));
    assert_eq!(t, json!({"city": "LA"}));
}

#[test]
fn test_sealed_missing_read_fails() {
    let t = sealed_tree(json!({"city": "NY"}));
    assert!(matches!(
        t.at("missing").unwrap_err(),
        TreeError::LockedKeyNotFound { lock: Lock::Sealed, .. }
    ));
    assert_eq!(t.get("missing"), None);
}

#[test]
fn test_sealed_mapping_blocks_resizing() {
    let t = sealed_tree(json!({"a": 1, "b": 2}));
    assert!(t.delete("a").is_err());
    assert!(t.as_mapping().unwrap().pop("a").is_err());
    assert!(t.as_mapping().unwrap().clear().is_err());
    assert!(t.update([("c", 3)]).is_err());
    t.update([("a", 10)]).unwrap();
    assert!(t.setdefault("z", 1).is_err());
    assert_eq!(t.setdefault("b", 1).unwrap(), 2);
    assert_eq!(t, json!({"a": 10, "b": 2}));
}

#[test]
fn test_sealed_sequence_blocks_resizing_only() {
    let t = sealed_tree(json!({"list": [3, 1, 2]}));
    let list = t.at("list").unwrap().as_sequence().unwrap();

    assert!(list.is_sealed());
    assert!(is_locked(&list.append(4).unwrap_err(), Lock::Sealed));
    assert!(list.extend([4]).is_err());
    assert!(list.insert(0, 4).is_err());
    assert!(list.remove(1).is_err());
    assert!(list.pop(None).is_err());
    assert!(list.delete(0).is_err());
    assert!(list.clear().is_err());

    list.set(0, 30).unwrap();
    list.sort(false).unwrap();
    list.reverse().unwrap();
    assert_eq!(list, json!([30, 2, 1]));
}

#[test]
fn test_sealed_children_are_sealed() {
    let t = sealed_tree(json!({"a": {"b": [1]}}));
    assert!(t.at("a").unwrap().is_sealed());
    assert!(t.get_path(["a", "b"]).unwrap().is_sealed());

    t.at("a").unwrap().set("b", json!({"c": 1})).unwrap();
    assert!(t.get_path(["a", "b"]).unwrap().is_sealed());
}

// ═══════════════════════════════════════════════════════════════════════
// Frozen
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_frozen_blocks_all_mutation() {
    let t = frozen_tree(json!({"city": "NY", "tags": ["a"]}));

    assert!(is_locked(&t.set("city", "LA").unwrap_err(), Lock::Frozen));
    assert!(matches!(
        t.at("missing").unwrap_err(),
        TreeError::LockedKeyNotFound { lock: Lock::Frozen, .. }
    ));
    assert_eq!(t.at("city").unwrap(), "NY");

    assert!(t.update([("city", "LA")]).is_err());
    assert!(t.delete("city").is_err());

    let tags = t.at("tags").unwrap();
    assert!(tags.append("b").is_err());
    assert!(tags.set(0, "b").is_err());
    assert!(tags.as_sequence().unwrap().sort(false).is_err());
    assert!(tags.as_sequence().unwrap().reverse().is_err());

    assert_eq!(t, json!({"city": "NY", "tags": ["a"]}));
}

#[test]
fn test_locked_error_message() {
    let t = frozen_tree(json!({"city": "NY"}));
    let err = t.set("city", "LA").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Policy violation: cannot set a frozen mapping node"
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Flag transformations
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_frozen_and_sealed_queries() {
    let t = Value::from(json!({"a": [1]}));
    assert!(!frozen(&t).unwrap());
    assert!(!sealed(&t).unwrap());
    assert!(frozen(&Value::from(1)).is_err());
    assert!(sealed(&Value::from("text")).is_err());
}

#[test]
fn test_freeze() {
    let t = Value::from(json!({"friends": [{"name": "David"}]}));
    let f = freeze(&t).unwrap();

    assert!(frozen(&f).unwrap());
    assert!(frozen(&f.at("friends").unwrap()).unwrap());
    assert!(frozen(&f.get_path([Index::from("friends"), Index::from(0)]).unwrap()).unwrap());
    assert!(!frozen(&t).unwrap());
    assert_eq!(f, t);

    assert!(matches!(
        freeze(&Value::from(1)).unwrap_err(),
        TreeError::TypeError { .. }
    ));
}

#[test]
fn test_unfreeze() {
    let f = frozen_tree(json!({"friends": [{"name": "David"}]}));
    let t = unfreeze(&f).unwrap();

    assert!(!frozen(&t).unwrap());
    t.at("friends").unwrap().append_entries([("name", "Celine")]).unwrap();
    assert_eq!(t.at("friends").unwrap().len(), 2);
    assert_eq!(f.at("friends").unwrap().len(), 1);
}

#[test]
fn test_sealing_and_unsealing() {
    let t = Value::from(json!({"name": "David"}));
    let s = seal(&t).unwrap();
    assert!(sealed(&s).unwrap());
    assert!(s.set("age", 29).is_err());

    let u = unseal(&s).unwrap();
    assert!(!sealed(&u).unwrap());
    u.set("age", 29).unwrap();
    assert_eq!(u, json!({"name": "David", "age": 29}));
}

#[test]
fn test_transformations_keep_the_other_flag() {
    let t = loads(r#"{"a": {"b": 1}}"#, Flags::new(true, true)).unwrap();

    let unsealed = unseal(&t).unwrap();
    assert!(frozen(&unsealed).unwrap());
    assert!(!sealed(&unsealed).unwrap());

    let thawed = unfreeze(&t).unwrap();
    assert!(sealed(&thawed).unwrap());
    assert!(!frozen(&thawed.at("a").unwrap()).unwrap());
}

#[test]
fn test_flags_on_resolved_reference() {
    let root = Value::mapping();
    let pending = root.at("child").unwrap();
    assert!(frozen(&pending).is_err());

    pending.set("x", 1).unwrap();
    assert!(!frozen(&pending).unwrap());
    let f = freeze(&pending).unwrap();
    assert!(f.is_frozen());
    assert!(!root.at("child").unwrap().is_frozen());
}
