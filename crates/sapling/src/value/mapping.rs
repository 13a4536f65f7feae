//! Mapping nodes

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{Container, NodeClass, Undefined, Value};
use crate::cast::cast;
use crate::error::{Result, TreeError};
use crate::flags::Flags;

const KIND: &str = "mapping";

/// An ordered key/value node.
///
/// Uses IndexMap to preserve insertion order for iteration; order is not
/// part of equality. Reading an absent key through [`Mapping::at`] yields an
/// [`Undefined`] placeholder instead of an error, unless the mapping is
/// sealed or frozen.
///
/// # Example
///
/// ```
/// use sapling::{Mapping, Value};
///
/// let config = Mapping::new();
/// config.at("server").unwrap().set("port", 8080).unwrap();
///
/// assert_eq!(config.at("server").unwrap().at("port").unwrap(), 8080);
/// ```
#[derive(Clone)]
pub struct Mapping {
    inner: Rc<MappingInner>,
}

struct MappingInner {
    entries: RefCell<IndexMap<String, Value>>,
    flags: Flags,
    class: Option<Rc<dyn NodeClass>>,
}

impl Default for Mapping {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapping {
    /// Create an empty, unlocked mapping.
    pub fn new() -> Self {
        Self::with_flags(Flags::default())
    }

    /// Create an empty mapping with the given flags.
    pub fn with_flags(flags: Flags) -> Self {
        Self::build(None, IndexMap::new(), flags)
    }

    /// Create a mapping from entries, casting every value.
    pub fn from_entries<I, K, V>(entries: I, flags: Flags) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::build(None, cast_entries(entries, flags), flags)
    }

    /// Create a mapping carrying a user-defined class.
    pub fn with_class<I, K, V>(class: Rc<dyn NodeClass>, entries: I, flags: Flags) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::build(Some(class), cast_entries(entries, flags), flags)
    }

    /// Create a mapping with every key bound to the same (cast) value.
    pub fn from_keys<I, K>(keys: I, value: impl Into<Value>, flags: Flags) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let value = cast(value.into(), flags);
        let entries = keys
            .into_iter()
            .map(|k| (k.into(), value.clone()))
            .collect();
        Self::build(None, entries, flags)
    }

    fn build(
        class: Option<Rc<dyn NodeClass>>,
        entries: IndexMap<String, Value>,
        flags: Flags,
    ) -> Self {
        Self {
            inner: Rc::new(MappingInner {
                entries: RefCell::new(entries),
                flags,
                class,
            }),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// Whether new keys are rejected.
    pub fn is_sealed(&self) -> bool {
        self.inner.flags.sealed
    }

    /// Whether all mutation is rejected.
    pub fn is_frozen(&self) -> bool {
        self.inner.flags.frozen
    }

    /// Whether this mapping carries the class `T`.
    pub fn is_instance<T: NodeClass + 'static>(&self) -> bool {
        self.inner
            .class
            .as_ref()
            .is_some_and(|c| c.as_any().is::<T>())
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// Whether the mapping has no keys.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.entries.borrow().contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.entries.borrow().keys().cloned().collect()
    }

    /// Values in insertion order.
    pub fn values(&self) -> Vec<Value> {
        self.inner.entries.borrow().values().cloned().collect()
    }

    /// Key/value pairs in insertion order.
    pub fn items(&self) -> Vec<(String, Value)> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Iterate over a snapshot of the entries.
    pub fn iter(&self) -> std::vec::IntoIter<(String, Value)> {
        self.items().into_iter()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Reads
    // ═══════════════════════════════════════════════════════════════════

    /// The stored value at `key`, if any. Never yields a placeholder.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.entries.borrow().get(key).cloned()
    }

    /// The stored value at `key`, or `default`.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.get(key).unwrap_or_else(|| default.into())
    }

    /// Member access.
    ///
    /// Returns the stored value, or an [`Undefined`] bound to this mapping
    /// and `key` when absent.
    ///
    /// # Errors
    ///
    /// Returns `LockedKeyNotFound` if the key is absent and the mapping is
    /// sealed or frozen.
    pub fn at(&self, key: impl Into<String>) -> Result<Value> {
        let key = key.into();
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        match self.inner.flags.lock() {
            Some(lock) => Err(TreeError::LockedKeyNotFound { key, lock }),
            None => Ok(Value::Undefined(Undefined::member(self.clone(), key))),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Mutation
    // ═══════════════════════════════════════════════════════════════════

    /// Store `value` at `key`, cast to this mapping's flags.
    ///
    /// # Errors
    ///
    /// Returns `Locked` if the mapping is frozen, or sealed and `key` is new.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        self.ensure_can_store(&key, "set")?;
        let value = cast(value.into(), self.inner.flags);
        self.inner.entries.borrow_mut().insert(key, value);
        Ok(())
    }

    /// Remove `key`.
    ///
    /// # Errors
    ///
    /// Returns `Locked` if the mapping is sealed or frozen, `KeyNotFound`
    /// if the key is absent.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.pop(key).map(|_| ())
    }

    /// Remove `key` and return its value.
    ///
    /// # Errors
    ///
    /// Same as [`Mapping::delete`].
    pub fn pop(&self, key: &str) -> Result<Value> {
        self.inner.flags.ensure_resizable("remove keys from", KIND)?;
        self.inner
            .entries
            .borrow_mut()
            .shift_remove(key)
            .ok_or_else(|| TreeError::KeyNotFound {
                key: key.to_string(),
            })
    }

    /// Remove every key.
    pub fn clear(&self) -> Result<()> {
        self.inner.flags.ensure_resizable("clear", KIND)?;
        self.inner.entries.borrow_mut().clear();
        Ok(())
    }

    /// Merge entries into this mapping, casting every value.
    ///
    /// Nothing is stored unless every entry is accepted.
    ///
    /// # Errors
    ///
    /// Returns `Locked` if the mapping is frozen, or sealed and any key is new.
    pub fn update<I, K, V>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.inner.flags.ensure_mutable("update", KIND)?;
        let incoming = cast_entries(entries, self.inner.flags);
        for key in incoming.keys() {
            self.ensure_can_store(key, "update")?;
        }
        self.inner.entries.borrow_mut().extend(incoming);
        Ok(())
    }

    /// Return the value at `key`, storing `value` first if absent.
    ///
    /// # Errors
    ///
    /// Same policy as [`Mapping::set`] when the key is absent.
    pub fn setdefault(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<Value> {
        let key = key.into();
        if let Some(existing) = self.get(&key) {
            return Ok(existing);
        }
        self.set(key.clone(), value)?;
        self.get(&key).ok_or(TreeError::KeyNotFound { key })
    }

    fn ensure_can_store(&self, key: &str, operation: &str) -> Result<()> {
        self.inner.flags.ensure_mutable(operation, KIND)?;
        if !self.contains_key(key) {
            self.inner
                .flags
                .ensure_resizable(&format!("add key {:?} to", key), KIND)?;
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Copies
    // ═══════════════════════════════════════════════════════════════════

    /// Shallow copy: a new mapping sharing the same children.
    pub fn copy(&self) -> Self {
        Self::build(
            self.inner.class.clone(),
            self.inner.entries.borrow().clone(),
            self.inner.flags,
        )
    }

    /// Deep copy: every nested node is rebuilt.
    pub fn deep_copy(&self) -> Self {
        let entries = self
            .items()
            .into_iter()
            .map(|(k, v)| (k, deep_copy_value(v)))
            .collect();
        Self::build(self.inner.class.clone(), entries, self.inner.flags)
    }
}

pub(super) fn deep_copy_value(value: Value) -> Value {
    match value {
        Value::Mapping(m) => Value::Mapping(m.deep_copy()),
        Value::Sequence(s) => Value::Sequence(s.deep_copy()),
        other => other,
    }
}

fn cast_entries<I, K, V>(entries: I, flags: Flags) -> IndexMap<String, Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), cast(v.into(), flags)))
        .collect()
}

impl Container for Mapping {
    fn flags(&self) -> Flags {
        self.inner.flags
    }

    fn class(&self) -> Option<Rc<dyn NodeClass>> {
        self.inner.class.clone()
    }

    fn rebuild(&self, flags: Flags) -> Self {
        let entries = self
            .items()
            .into_iter()
            .map(|(k, v)| (k, cast(v, flags)))
            .collect();
        Self::build(self.inner.class.clone(), entries, flags)
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let ours = self.inner.entries.borrow();
        let theirs = other.inner.entries.borrow();
        ours.len() == theirs.len()
            && ours
                .iter()
                .all(|(k, v)| theirs.get(k).is_some_and(|other| v == other))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_entries(iter, Flags::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::Lock;

    #[test]
    fn test_insertion_order() {
        let m = Mapping::from_entries([("b", 1), ("a", 2), ("c", 3)], Flags::default());
        assert_eq!(m.keys(), vec!["b", "a", "c"]);
        m.delete("a").unwrap();
        m.set("a", 4).unwrap();
        assert_eq!(m.keys(), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_equality_ignores_order_and_flags() {
        let a = Mapping::from_entries([("x", 1), ("y", 2)], Flags::default());
        let b = Mapping::from_entries([("y", 2), ("x", 1)], Flags::frozen());
        assert!(a == b);
    }

    #[test]
    fn test_at_on_sealed_reports_lock() {
        let m = Mapping::with_flags(Flags::sealed());
        let err = m.at("name").unwrap_err();
        assert!(matches!(
            err,
            TreeError::LockedKeyNotFound {
                lock: Lock::Sealed,
                ..
            }
        ));
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let m = Mapping::from_entries([("a", 1)], Flags::sealed());
        assert!(m.update([("a", 2), ("b", 3)]).is_err());
        assert_eq!(m.get("a"), Some(Value::Int(1)));
        assert!(!m.contains_key("b"));
    }

    #[test]
    fn test_from_keys_shares_value() {
        let m = Mapping::from_keys(["a", "b"], Mapping::new(), Flags::default());
        assert_eq!(m.len(), 2);
        assert!(m.get("a").unwrap().ptr_eq(&m.get("b").unwrap()));
    }

    #[test]
    fn test_copy_keeps_flags_and_shares_children() {
        let m = Mapping::from_entries(
            [("inner", Value::Mapping(Mapping::new()))],
            Flags::sealed(),
        );
        let copy = m.copy();
        assert!(!copy.ptr_eq(&m));
        assert!(copy.is_sealed());
        assert!(copy.get("inner").unwrap().ptr_eq(&m.get("inner").unwrap()));

        let deep = m.deep_copy();
        assert!(!deep.get("inner").unwrap().ptr_eq(&m.get("inner").unwrap()));
        assert!(deep == m);
    }
}
