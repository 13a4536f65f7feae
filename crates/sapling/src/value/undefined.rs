//! Undefined references: placeholders for nodes that do not exist yet
//!
//! An [`Undefined`] remembers where a node *would* live: either a key under a
//! parent (a mapping, or another undefined reference), or an empty root slot.
//! It holds no data of its own.
//!
//! Every operation starts with a liveness check that walks the anchor chain.
//! If the slot now holds a value (because another handle wrote it), the
//! operation is delegated to that value. Otherwise reads answer "empty" and
//! writes materialize the chain: unresolved ancestors become mappings, and
//! the slot itself becomes a mapping or a sequence depending on the write.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::sequence::append_argument;
use super::{Container, Mapping, NodeKind, Sequence, Value};
use crate::error::{type_name, Result, TreeError};
use crate::flags::Flags;
use crate::index::Index;

/// A reference to a node that does not exist yet.
///
/// Cloning shares the anchor, so clones of a root reference observe the
/// same slot.
#[derive(Clone)]
pub struct Undefined {
    anchor: Rc<Anchor>,
}

enum Anchor {
    /// Empty root returned by [`crate::tree`]
    Root(RefCell<Option<Value>>),

    /// Absent key under a parent
    Member { parent: Parent, key: String },
}

#[derive(Clone)]
enum Parent {
    Mapping(Mapping),
    Undefined(Undefined),
}

impl Parent {
    fn resolve(&self) -> Option<Value> {
        match self {
            Parent::Mapping(mapping) => Some(Value::Mapping(mapping.clone())),
            Parent::Undefined(undefined) => undefined.resolve(),
        }
    }

    /// Materialize the parent; parents reached by key are always mappings.
    fn materialize(&self) -> Result<Mapping> {
        match self {
            Parent::Mapping(mapping) => Ok(mapping.clone()),
            Parent::Undefined(undefined) => {
                match undefined.materialize(NodeKind::Mapping, "set a key on")? {
                    Value::Mapping(mapping) => Ok(mapping),
                    other => Err(TreeError::shape("set a key on", &other)),
                }
            }
        }
    }
}

impl Undefined {
    /// A fresh, unresolved root.
    pub fn root() -> Self {
        Self {
            anchor: Rc::new(Anchor::Root(RefCell::new(None))),
        }
    }

    pub(crate) fn member(parent: Mapping, key: String) -> Self {
        Self::anchored(Parent::Mapping(parent), key)
    }

    fn child(&self, key: String) -> Self {
        Self::anchored(Parent::Undefined(self.clone()), key)
    }

    fn anchored(parent: Parent, key: String) -> Self {
        Self {
            anchor: Rc::new(Anchor::Member { parent, key }),
        }
    }

    /// The key this reference is bound to (`None` for a root).
    pub fn key(&self) -> Option<&str> {
        match &*self.anchor {
            Anchor::Root(_) => None,
            Anchor::Member { key, .. } => Some(key),
        }
    }

    /// Dotted path from the nearest live node, for diagnostics.
    pub fn path(&self) -> String {
        match &*self.anchor {
            Anchor::Root(_) => String::new(),
            Anchor::Member {
                parent: Parent::Mapping(_),
                key,
            } => key.clone(),
            Anchor::Member {
                parent: Parent::Undefined(parent),
                key,
            } => {
                let prefix = parent.path();
                if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                }
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Liveness
    // ═══════════════════════════════════════════════════════════════════

    /// The value currently stored in this reference's slot, if any.
    ///
    /// Re-evaluated on every call. An ancestor that was materialized as
    /// something other than a mapping leaves the reference unresolved.
    pub fn resolve(&self) -> Option<Value> {
        match &*self.anchor {
            Anchor::Root(slot) => slot.borrow().clone(),
            Anchor::Member { parent, key } => match parent.resolve()? {
                Value::Mapping(mapping) => mapping.get(key),
                _ => None,
            },
        }
    }

    /// Whether the slot is still empty.
    pub fn is_unresolved(&self) -> bool {
        self.resolve().is_none()
    }

    /// Materialize this reference (and its unresolved ancestors) as `kind`.
    ///
    /// A slot that already holds a node of the same kind is reused, so
    /// repeated materialization never duplicates or overwrites a node.
    ///
    /// # Errors
    ///
    /// Returns `ShapeConflict` if the slot (or an ancestor) already holds a
    /// value of another kind.
    pub fn materialize(&self, kind: NodeKind, operation: &str) -> Result<Value> {
        match &*self.anchor {
            Anchor::Root(slot) => {
                if let Some(existing) = slot.borrow().clone() {
                    return reuse(existing, kind, operation);
                }
                let node = kind.create(Flags::default());
                *slot.borrow_mut() = Some(node.clone());
                tracing::debug!(?kind, "materialized root node");
                Ok(node)
            }
            Anchor::Member { parent, key } => {
                let mapping = parent.materialize()?;
                if let Some(existing) = mapping.get(key) {
                    return reuse(existing, kind, operation);
                }
                mapping.set(key.clone(), kind.create(mapping.flags()))?;
                tracing::debug!(?kind, path = %self.path(), "materialized undefined node");
                mapping
                    .get(key)
                    .ok_or_else(|| TreeError::KeyNotFound { key: key.clone() })
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Reads
    // ═══════════════════════════════════════════════════════════════════

    /// Member access.
    ///
    /// Keys on an unresolved reference yield a deeper reference; positions
    /// and slices are ambiguous until the node's kind is known.
    pub fn at(&self, index: impl Into<Index>) -> Result<Value> {
        let index = index.into();
        if let Some(resolved) = self.resolve() {
            return resolved.at(index);
        }
        match index {
            Index::Key(key) => Ok(Value::Undefined(self.child(key))),
            positional => Err(ambiguous("read", &positional)),
        }
    }

    /// The stored value at `index`, or `None` while unresolved.
    pub fn get(&self, index: impl Into<Index>) -> Option<Value> {
        self.resolve()?.get(index)
    }

    /// Number of entries; 0 while unresolved.
    pub fn len(&self) -> usize {
        self.resolve().map_or(0, |v| v.len())
    }

    /// Whether there are no entries; always true while unresolved.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Truthiness; false while unresolved.
    pub fn is_truthy(&self) -> bool {
        self.resolve().is_some_and(|v| v.is_truthy())
    }

    /// Membership; false while unresolved.
    pub fn contains(&self, value: &Value) -> bool {
        self.resolve().is_some_and(|v| v.contains(value))
    }

    /// The resolved node, or this reference while unresolved.
    pub fn enter(&self) -> Value {
        self.resolve()
            .unwrap_or_else(|| Value::Undefined(self.clone()))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Writes
    // ═══════════════════════════════════════════════════════════════════

    /// Assign a member, materializing this reference as a mapping.
    pub fn set(&self, index: impl Into<Index>, value: impl Into<Value>) -> Result<()> {
        let index = index.into();
        if let Some(resolved) = self.resolve() {
            return resolved.set(index, value);
        }
        match index {
            Index::Key(key) => self.mapping("set a key on")?.set(key, value),
            positional => Err(ambiguous("assign", &positional)),
        }
    }

    /// Delete a member of the resolved node.
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` (or `Ambiguous` for positions) while unresolved.
    pub fn delete(&self, index: impl Into<Index>) -> Result<()> {
        let index = index.into();
        if let Some(resolved) = self.resolve() {
            return resolved.delete(index);
        }
        match index {
            Index::Key(key) => Err(TreeError::KeyNotFound { key }),
            positional => Err(ambiguous("delete", &positional)),
        }
    }

    /// Merge entries, materializing this reference as a mapping.
    pub fn update<I, K, V>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.mapping("update")?.update(entries)
    }

    /// `setdefault`, materializing this reference as a mapping.
    pub fn setdefault(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<Value> {
        self.mapping("setdefault")?.setdefault(key, value)
    }

    /// Append, materializing this reference as a sequence.
    pub fn append(&self, value: impl Into<Value>) -> Result<Value> {
        self.sequence("append to")?.append(value)
    }

    /// Positional-or-keyword append, materializing this reference as a
    /// sequence. Arguments are validated before anything is created.
    pub fn append_args<P, K, V>(&self, positional: P, keywords: K) -> Result<Value>
    where
        P: IntoIterator<Item = Value>,
        K: IntoIterator<Item = (String, V)>,
        V: Into<Value>,
    {
        let value = append_argument(positional, keywords, Flags::default())?;
        self.sequence("append to")?.append(value)
    }

    /// Keyword append, materializing this reference as a sequence.
    pub fn append_entries<I, K, V>(&self, entries: I) -> Result<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.append_args(
            std::iter::empty(),
            entries.into_iter().map(|(k, v)| (k.into(), v)),
        )
    }

    /// Extend, materializing this reference as a sequence.
    pub fn extend<I, V>(&self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.sequence("extend")?.extend(values)
    }

    /// Insert, materializing this reference as a sequence.
    pub fn insert(&self, position: isize, value: impl Into<Value>) -> Result<()> {
        self.sequence("insert into")?.insert(position, value)
    }

    fn mapping(&self, operation: &str) -> Result<Mapping> {
        match self.materialize(NodeKind::Mapping, operation)? {
            Value::Mapping(mapping) => Ok(mapping),
            other => Err(TreeError::shape(operation, &other)),
        }
    }

    fn sequence(&self, operation: &str) -> Result<Sequence> {
        match self.materialize(NodeKind::Sequence, operation)? {
            Value::Sequence(sequence) => Ok(sequence),
            other => Err(TreeError::shape(operation, &other)),
        }
    }
}

fn reuse(existing: Value, kind: NodeKind, operation: &str) -> Result<Value> {
    if kind.matches(&existing) {
        Ok(existing)
    } else {
        Err(TreeError::ShapeConflict {
            operation: operation.to_string(),
            kind: type_name(&existing).to_string(),
        })
    }
}

fn ambiguous(operation: &str, index: &Index) -> TreeError {
    TreeError::Ambiguous {
        operation: operation.to_string(),
        index: index.to_string(),
    }
}

impl fmt::Debug for Undefined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolve() {
            Some(resolved) => fmt::Debug::fmt(&resolved, f),
            None => write!(f, "undefined({})", self.path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_starts_unresolved() {
        let root = Undefined::root();
        assert!(root.is_unresolved());
        assert_eq!(root.key(), None);
        assert_eq!(root.len(), 0);
    }

    #[test]
    fn test_path_follows_chain() {
        let m = Mapping::new();
        let deep = m.at("a").unwrap().at("b").unwrap().at("c").unwrap();
        match deep {
            Value::Undefined(u) => {
                assert_eq!(u.path(), "a.b.c");
                assert_eq!(u.key(), Some("c"));
            }
            other => panic!("Expected undefined, got {:?}", other),
        }
    }

    #[test]
    fn test_materialize_reuses_same_kind() {
        let m = Mapping::new();
        let Value::Undefined(u) = m.at("items").unwrap() else {
            panic!("Expected undefined");
        };
        let first = u.materialize(NodeKind::Sequence, "append to").unwrap();
        let second = u.materialize(NodeKind::Sequence, "append to").unwrap();
        assert!(first.ptr_eq(&second));
        assert!(u
            .materialize(NodeKind::Mapping, "set a key on")
            .is_err());
    }

    #[test]
    fn test_materialized_node_inherits_parent_flags() {
        let m = Mapping::new();
        let Value::Undefined(u) = m.at("child").unwrap() else {
            panic!("Expected undefined");
        };
        let node = u.materialize(NodeKind::Mapping, "set a key on").unwrap();
        assert!(!node.is_sealed());
        assert!(!node.is_frozen());
        assert!(m.get("child").unwrap().ptr_eq(&node));
    }

    #[test]
    fn test_ancestor_of_other_kind_leaves_reference_unresolved() {
        let m = Mapping::new();
        let stale = m.at("a").unwrap().at("b").unwrap();
        m.set("a", Value::from(vec![1, 2])).unwrap();
        assert!(stale.is_undefined());
        assert!(stale.set("c", 1).is_err());
    }

    #[test]
    fn test_invalid_append_does_not_materialize() {
        let m = Mapping::new();
        let Value::Undefined(u) = m.at("items").unwrap() else {
            panic!("Expected undefined");
        };
        let none: Vec<(String, Value)> = Vec::new();
        assert!(u.append_args(Vec::new(), none).is_err());
        assert!(u.is_unresolved());
        assert!(!m.contains_key("items"));
    }
}
