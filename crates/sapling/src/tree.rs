//! Tree construction and flag transformations
//!
//! Flags are fixed per node, so changing one means a recursive re-cast:
//! the result is a new node (new identity) whenever a flag actually
//! changes, and the same node otherwise.

use crate::cast::cast;
use crate::error::{Result, TreeError};
use crate::flags::Flags;
use crate::value::{Undefined, Value};

/// An empty tree whose root kind is decided by the first write.
///
/// ```
/// use sapling::tree;
///
/// let root = tree();
/// root.at("server").unwrap().set("port", 8080).unwrap();
/// assert!(root.is_mapping());
/// assert_eq!(root.get_path(["server", "port"]).unwrap(), 8080);
/// ```
pub fn tree() -> Value {
    Value::Undefined(Undefined::root())
}

/// A tree built from initial data, cast to unlocked nodes.
///
/// `Null` gives an empty [`tree`]; other scalars are returned unchanged.
pub fn new(initial: impl Into<Value>) -> Value {
    match initial.into() {
        Value::Null => tree(),
        Value::Undefined(u) if u.is_unresolved() => Value::Undefined(u),
        value => cast(value, Flags::default()),
    }
}

/// Whether the node is frozen.
pub fn frozen(tree: &Value) -> Result<bool> {
    Ok(node_flags(tree)?.frozen)
}

/// Whether the node is sealed.
pub fn sealed(tree: &Value) -> Result<bool> {
    Ok(node_flags(tree)?.sealed)
}

/// A frozen version of the tree; sealing is kept as it was.
pub fn freeze(tree: &Value) -> Result<Value> {
    let flags = node_flags(tree)?;
    Ok(recast(tree, flags.with_frozen(true)))
}

/// An unfrozen version of the tree; sealing is kept as it was.
pub fn unfreeze(tree: &Value) -> Result<Value> {
    let flags = node_flags(tree)?;
    Ok(recast(tree, flags.with_frozen(false)))
}

/// A sealed version of the tree; freezing is kept as it was.
pub fn seal(tree: &Value) -> Result<Value> {
    let flags = node_flags(tree)?;
    Ok(recast(tree, flags.with_sealed(true)))
}

/// An unsealed version of the tree; freezing is kept as it was.
pub fn unseal(tree: &Value) -> Result<Value> {
    let flags = node_flags(tree)?;
    Ok(recast(tree, flags.with_sealed(false)))
}

fn node_flags(tree: &Value) -> Result<Flags> {
    tree.flags()
        .ok_or_else(|| TreeError::type_error("mapping or sequence", tree))
}

fn recast(tree: &Value, flags: Flags) -> Value {
    cast(tree.enter(), flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_passes_scalars_through() {
        assert_eq!(new(5), 5);
        assert_eq!(new(true), true);
        assert!(new(()).is_undefined());
    }

    #[test]
    fn test_new_from_data() {
        let t = new(json!({"a": [1, 2]}));
        assert!(t.is_mapping());
        assert!(!frozen(&t).unwrap());
        assert!(!sealed(&t).unwrap());
    }

    #[test]
    fn test_flag_api_on_scalar_is_type_error() {
        let scalar = Value::from(1);
        assert!(frozen(&scalar).is_err());
        assert!(freeze(&scalar).is_err());
        assert!(unseal(&tree()).is_err());
    }

    #[test]
    fn test_freeze_keeps_sealed() {
        let t = seal(&new(json!({"a": {"b": 1}}))).unwrap();
        let f = freeze(&t).unwrap();
        assert!(sealed(&f).unwrap());
        assert!(frozen(&f).unwrap());
        assert!(f.at("a").unwrap().is_sealed());
        assert!(f.at("a").unwrap().is_frozen());

        let thawed = unfreeze(&f).unwrap();
        assert!(sealed(&thawed).unwrap());
        assert!(!frozen(&thawed).unwrap());
    }

    #[test]
    fn test_noop_transform_keeps_identity() {
        let t = new(json!([1]));
        assert!(unfreeze(&t).unwrap().ptr_eq(&t));
        assert!(!freeze(&t).unwrap().ptr_eq(&t));
    }

    #[test]
    fn test_root_tree_resolves_after_write() {
        let root = tree();
        root.append(1).unwrap();
        assert!(root.is_sequence());
        assert!(!frozen(&root).unwrap());
        let f = freeze(&root).unwrap();
        assert!(f.is_sequence());
        assert_eq!(f, json!([1]));
    }
}
