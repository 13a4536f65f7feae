//! Value trait implementations: constructors, predicates, extractors,
//! node operations, From traits, PartialEq and PartialOrd

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;

use super::*;
use crate::error::{Result, TreeError};
use crate::flags::Flags;
use crate::index::Index;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create an empty, unlocked mapping node
    pub fn mapping() -> Self {
        Value::Mapping(Mapping::new())
    }

    /// Create an empty, unlocked sequence node
    pub fn sequence() -> Self {
        Value::Sequence(Sequence::new())
    }

    /// The live value: undefined references are replaced by what they
    /// resolve to, or kept when unresolved.
    pub fn enter(&self) -> Value {
        match self {
            Value::Undefined(u) => u.enter(),
            other => other.clone(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self.enter(), Value::Null)
    }

    /// Check if value is an unresolved undefined reference
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined(u) if u.is_unresolved())
    }

    /// Check if value is (or resolves to) a mapping node
    pub fn is_mapping(&self) -> bool {
        matches!(self.enter(), Value::Mapping(_))
    }

    /// Check if value is (or resolves to) a sequence node
    pub fn is_sequence(&self) -> bool {
        matches!(self.enter(), Value::Sequence(_))
    }

    /// Check if value is a scalar (null, bool, number or string)
    pub fn is_scalar(&self) -> bool {
        matches!(
            self.enter(),
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
        )
    }

    /// Whether the node is sealed (false for scalars and unresolved references)
    pub fn is_sealed(&self) -> bool {
        self.flags().is_some_and(|f| f.sealed)
    }

    /// Whether the node is frozen (false for scalars and unresolved references)
    pub fn is_frozen(&self) -> bool {
        self.flags().is_some_and(|f| f.frozen)
    }

    /// The node's flags, if this is (or resolves to) a node
    pub fn flags(&self) -> Option<Flags> {
        match self.enter() {
            Value::Mapping(m) => Some(m.flags()),
            Value::Sequence(s) => Some(s.flags()),
            _ => None,
        }
    }

    /// Whether both values are the same node (identity, not equality)
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self.enter(), other.enter()) {
            (Value::Mapping(a), Value::Mapping(b)) => a.ptr_eq(&b),
            (Value::Sequence(a), Value::Sequence(b)) => a.ptr_eq(&b),
            _ => false,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self.enter() {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Extract integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self.enter() {
            Value::Int(n) => Some(n),
            _ => None,
        }
    }

    /// Extract as f64 (converts from integers)
    pub fn as_f64(&self) -> Option<f64> {
        match self.enter() {
            Value::Int(n) => Some(n as f64),
            Value::Float(n) => Some(n),
            _ => None,
        }
    }

    /// Extract string slice (direct strings only)
    ///
    /// An undefined reference whose key has since been set to a string
    /// returns `None` here, since the slice cannot borrow from the parent
    /// slot. Use [`Value::as_string`] to read through references.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract an owned string, entering undefined references first
    pub fn as_string(&self) -> Option<String> {
        match self.enter() {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract the mapping node handle
    pub fn as_mapping(&self) -> Option<Mapping> {
        match self.enter() {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Extract the sequence node handle
    pub fn as_sequence(&self) -> Option<Sequence> {
        match self.enter() {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Extract the undefined reference
    pub fn as_undefined(&self) -> Option<&Undefined> {
        match self {
            Value::Undefined(u) => Some(u),
            _ => None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Read-only Projection
    // ═══════════════════════════════════════════════════════════════════

    /// Number of entries (keys, elements or characters); 0 for other scalars
    /// and unresolved references.
    pub fn len(&self) -> usize {
        match self {
            Value::Mapping(m) => m.len(),
            Value::Sequence(s) => s.len(),
            Value::String(s) => s.chars().count(),
            Value::Undefined(u) => u.len(),
            _ => 0,
        }
    }

    /// Whether [`Value::len`] is 0
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Truthiness of the value
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Mapping(m) => !m.is_empty(),
            Value::Sequence(s) => !s.is_empty(),
            Value::Undefined(u) => u.is_truthy(),
        }
    }

    /// Membership: key presence for mappings, element equality for
    /// sequences, substring for strings
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Value::Mapping(m) => value.as_str().is_some_and(|k| m.contains_key(k)),
            Value::Sequence(s) => s.contains(value),
            Value::String(s) => value.as_str().is_some_and(|needle| s.contains(needle)),
            Value::Undefined(u) => u.contains(value),
            _ => false,
        }
    }

    /// Iterate: mapping keys, sequence elements, nothing otherwise
    pub fn iter(&self) -> std::vec::IntoIter<Value> {
        match self.enter() {
            Value::Mapping(m) => m
                .keys()
                .into_iter()
                .map(Value::String)
                .collect::<Vec<_>>()
                .into_iter(),
            Value::Sequence(s) => s.iter(),
            _ => Vec::new().into_iter(),
        }
    }

    /// The stored value at `index`; never errors, never a placeholder
    pub fn get(&self, index: impl Into<Index>) -> Option<Value> {
        match (self, index.into()) {
            (Value::Mapping(m), Index::Key(key)) => m.get(&key),
            (Value::Sequence(s), Index::Position(pos)) => s.get(pos),
            (Value::Sequence(s), Index::Slice(slice)) => Some(Value::Sequence(s.slice(&slice))),
            (Value::Undefined(u), index) => u.get(index),
            _ => None,
        }
    }

    /// The stored value at `index`, or `default`
    pub fn get_or(&self, index: impl Into<Index>, default: impl Into<Value>) -> Value {
        self.get(index).unwrap_or_else(|| default.into())
    }

    /// Follow a path of keys and positions.
    ///
    /// Returns `None` as soon as a step is absent, out of range or of the
    /// wrong shape. The empty path yields `None`.
    pub fn get_path<I, P>(&self, path: I) -> Option<Value>
    where
        I: IntoIterator<Item = P>,
        P: Into<Index>,
    {
        let mut steps = path.into_iter().peekable();
        steps.peek()?;
        let mut current = self.clone();
        for step in steps {
            current = current.get(step)?;
        }
        Some(current)
    }

    /// Member access.
    ///
    /// Mappings yield an [`Undefined`] for absent keys; undefined references
    /// yield deeper references.
    ///
    /// # Errors
    ///
    /// `ShapeConflict` for keys on sequences, positions on mappings and any
    /// index on scalars; `Ambiguous` for positions on unresolved references;
    /// `LockedKeyNotFound` for absent keys of locked mappings.
    pub fn at(&self, index: impl Into<Index>) -> Result<Value> {
        let index = index.into();
        match self {
            Value::Mapping(m) => match index {
                Index::Key(key) => m.at(key),
                positional => Err(TreeError::shape(format!("read at {}", positional), self)),
            },
            Value::Sequence(s) => s.at(index),
            Value::Undefined(u) => u.at(index),
            scalar => Err(TreeError::shape(format!("read at {}", index), scalar)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Mutation
    // ═══════════════════════════════════════════════════════════════════

    /// Assign a member; unresolved references materialize as mappings
    pub fn set(&self, index: impl Into<Index>, value: impl Into<Value>) -> Result<()> {
        let index = index.into();
        match self {
            Value::Mapping(m) => match index {
                Index::Key(key) => m.set(key, value),
                positional => Err(TreeError::shape(format!("assign at {}", positional), self)),
            },
            Value::Sequence(s) => s.set(index, value),
            Value::Undefined(u) => u.set(index, value),
            scalar => Err(TreeError::shape(format!("assign at {}", index), scalar)),
        }
    }

    /// Delete a member
    pub fn delete(&self, index: impl Into<Index>) -> Result<()> {
        let index = index.into();
        match self {
            Value::Mapping(m) => match index {
                Index::Key(key) => m.delete(&key),
                positional => Err(TreeError::shape(format!("delete at {}", positional), self)),
            },
            Value::Sequence(s) => s.delete(index),
            Value::Undefined(u) => u.delete(index),
            scalar => Err(TreeError::shape(format!("delete at {}", index), scalar)),
        }
    }

    /// Merge entries into a mapping
    pub fn update<I, K, V>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        match self {
            Value::Mapping(m) => m.update(entries),
            Value::Undefined(u) => u.update(entries),
            other => Err(TreeError::shape("update", other)),
        }
    }

    /// Return the value at `key`, storing `value` first if absent
    pub fn setdefault(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<Value> {
        match self {
            Value::Mapping(m) => m.setdefault(key, value),
            Value::Undefined(u) => u.setdefault(key, value),
            other => Err(TreeError::shape("setdefault", other)),
        }
    }

    /// Append and return the stored value; unresolved references
    /// materialize as sequences
    pub fn append(&self, value: impl Into<Value>) -> Result<Value> {
        match self {
            Value::Sequence(s) => s.append(value),
            Value::Undefined(u) => u.append(value),
            other => Err(TreeError::shape("append to", other)),
        }
    }

    /// Append one positional value or a mapping of keyword entries
    pub fn append_args<P, K, V>(&self, positional: P, keywords: K) -> Result<Value>
    where
        P: IntoIterator<Item = Value>,
        K: IntoIterator<Item = (String, V)>,
        V: Into<Value>,
    {
        match self {
            Value::Sequence(s) => s.append_args(positional, keywords),
            Value::Undefined(u) => u.append_args(positional, keywords),
            other => Err(TreeError::shape("append to", other)),
        }
    }

    /// Append a mapping built from keyword entries
    pub fn append_entries<I, K, V>(&self, entries: I) -> Result<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        match self {
            Value::Sequence(s) => s.append_entries(entries),
            Value::Undefined(u) => u.append_entries(entries),
            other => Err(TreeError::shape("append to", other)),
        }
    }

    /// Append every value
    pub fn extend<I, V>(&self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        match self {
            Value::Sequence(s) => s.extend(values),
            Value::Undefined(u) => u.extend(values),
            other => Err(TreeError::shape("extend", other)),
        }
    }

    /// Insert before a signed position
    pub fn insert(&self, position: isize, value: impl Into<Value>) -> Result<()> {
        match self {
            Value::Sequence(s) => s.insert(position, value),
            Value::Undefined(u) => u.insert(position, value),
            other => Err(TreeError::shape("insert into", other)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // Undefined references compare as what they resolve to (null if unresolved)
            (Value::Undefined(a), _) => a.resolve().unwrap_or(Value::Null) == *other,
            (_, Value::Undefined(b)) => *self == b.resolve().unwrap_or(Value::Null),

            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,

            // Numbers compare numerically across int and float
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }

            (Value::String(a), Value::String(b)) => a == b,

            // Containers compare by content; flags are not part of equality
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,

            // Different types are never equal
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Undefined(a), _) => a.resolve()?.partial_cmp(other),
            (_, Value::Undefined(b)) => self.partial_cmp(&b.resolve()?),

            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),

            // Sequences compare lexicographically
            (Value::Sequence(a), Value::Sequence(b)) => a.to_vec().partial_cmp(&b.to_vec()),

            // Mappings are unordered
            (Value::Mapping(a), Value::Mapping(b)) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }
}

macro_rules! impl_scalar_eq {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl PartialEq<$ty> for Value {
                fn eq(&self, other: &$ty) -> bool {
                    let $v = other;
                    *self == $conv
                }
            }
        )*
    };
}

impl_scalar_eq! {
    bool => |b| Value::Bool(*b),
    i32 => |n| Value::Int(i64::from(*n)),
    i64 => |n| Value::Int(*n),
    f64 => |n| Value::Float(*n),
    &str => |s| Value::string(*s),
    String => |s| Value::string(s.as_str()),
}

// ═══════════════════════════════════════════════════════════════════
// From Trait Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<u64> for Value {
    /// Values beyond `i64::MAX` become floats.
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(Value::Float(n as f64), Value::Int)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::from(n as u64)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(f64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::string(s.as_str())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(m)
    }
}

impl From<Sequence> for Value {
    fn from(s: Sequence) -> Self {
        Value::Sequence(s)
    }
}

impl From<Undefined> for Value {
    fn from(u: Undefined) -> Self {
        Value::Undefined(u)
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

// Raw containers become unlocked nodes; storing them casts to the
// container's flags.
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(Sequence::from_values(items, Flags::default()))
    }
}

impl<K: Into<String>, T: Into<Value>> From<IndexMap<K, T>> for Value {
    fn from(map: IndexMap<K, T>) -> Self {
        Value::Mapping(Mapping::from_entries(map, Flags::default()))
    }
}

impl<K: Into<String>, T: Into<Value>> From<BTreeMap<K, T>> for Value {
    fn from(map: BTreeMap<K, T>) -> Self {
        Value::Mapping(Mapping::from_entries(map, Flags::default()))
    }
}

impl<K: Into<String>, T: Into<Value>> From<HashMap<K, T>> for Value {
    fn from(map: HashMap<K, T>) -> Self {
        Value::Mapping(Mapping::from_entries(map, Flags::default()))
    }
}
