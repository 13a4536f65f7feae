//! Sequence nodes

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use super::mapping::deep_copy_value;
use super::{Container, Mapping, NodeClass, Value};
use crate::cast::cast;
use crate::error::{type_name, Result, TreeError};
use crate::flags::Flags;
use crate::index::{resolve_insertion, resolve_position, Index, Slice};

const KIND: &str = "sequence";

/// An ordered, index-addressable node.
///
/// Every value stored is cast to the sequence's flags first. [`Sequence::append`]
/// returns the stored value, so a freshly appended container can be filled
/// in place:
///
/// ```
/// use sapling::{Mapping, Sequence};
///
/// let axes = Sequence::new();
/// axes.append(Mapping::new()).unwrap().set("title", "primary").unwrap();
///
/// assert_eq!(axes.len(), 1);
/// assert_eq!(axes.at(0).unwrap().at("title").unwrap(), "primary");
/// ```
#[derive(Clone)]
pub struct Sequence {
    inner: Rc<SequenceInner>,
}

struct SequenceInner {
    items: RefCell<Vec<Value>>,
    flags: Flags,
    class: Option<Rc<dyn NodeClass>>,
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequence {
    /// Create an empty, unlocked sequence.
    pub fn new() -> Self {
        Self::with_flags(Flags::default())
    }

    /// Create an empty sequence with the given flags.
    pub fn with_flags(flags: Flags) -> Self {
        Self::build(None, Vec::new(), flags)
    }

    /// Create a sequence from values, casting every element.
    pub fn from_values<I, V>(values: I, flags: Flags) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::build(None, cast_values(values, flags), flags)
    }

    /// Create a sequence carrying a user-defined class.
    pub fn with_class<I, V>(class: Rc<dyn NodeClass>, values: I, flags: Flags) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::build(Some(class), cast_values(values, flags), flags)
    }

    fn build(class: Option<Rc<dyn NodeClass>>, items: Vec<Value>, flags: Flags) -> Self {
        Self {
            inner: Rc::new(SequenceInner {
                items: RefCell::new(items),
                flags,
                class,
            }),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// Whether growing and shrinking are rejected.
    pub fn is_sealed(&self) -> bool {
        self.inner.flags.sealed
    }

    /// Whether all mutation is rejected.
    pub fn is_frozen(&self) -> bool {
        self.inner.flags.frozen
    }

    /// Whether this sequence carries the class `T`.
    pub fn is_instance<T: NodeClass + 'static>(&self) -> bool {
        self.inner
            .class
            .as_ref()
            .is_some_and(|c| c.as_any().is::<T>())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    /// Whether the sequence has no elements.
    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    /// A snapshot of the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.items.borrow().clone()
    }

    /// Iterate over a snapshot of the elements.
    pub fn iter(&self) -> std::vec::IntoIter<Value> {
        self.to_vec().into_iter()
    }

    /// Whether an element equals `value`.
    pub fn contains(&self, value: &Value) -> bool {
        self.inner.items.borrow().iter().any(|v| v == value)
    }

    /// Position of the first element equal to `value`.
    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.inner.items.borrow().iter().position(|v| v == value)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Reads
    // ═══════════════════════════════════════════════════════════════════

    /// The element at a signed position, if in range.
    pub fn get(&self, position: isize) -> Option<Value> {
        let items = self.inner.items.borrow();
        resolve_position(position, items.len()).map(|i| items[i].clone())
    }

    /// A new sequence holding the elements of `slice` (children shared).
    pub fn slice(&self, slice: &Slice) -> Sequence {
        let items = self.inner.items.borrow();
        let range = slice.resolve(items.len());
        Self::build(
            self.inner.class.clone(),
            items[range].to_vec(),
            self.inner.flags,
        )
    }

    /// Index access by position or slice.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for positions past either end, and
    /// `ShapeConflict` for string keys.
    pub fn at(&self, index: impl Into<Index>) -> Result<Value> {
        match index.into() {
            Index::Position(pos) => self.get(pos).ok_or_else(|| self.out_of_range(pos)),
            Index::Slice(slice) => Ok(Value::Sequence(self.slice(&slice))),
            Index::Key(key) => Err(key_on_sequence("read", &key)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Growth
    // ═══════════════════════════════════════════════════════════════════

    /// Append a value and return the stored (cast) value.
    ///
    /// # Errors
    ///
    /// Returns `Locked` if the sequence is sealed or frozen.
    pub fn append(&self, value: impl Into<Value>) -> Result<Value> {
        self.inner.flags.ensure_resizable("append to", KIND)?;
        let value = cast(value.into(), self.inner.flags);
        self.inner.items.borrow_mut().push(value.clone());
        Ok(value)
    }

    /// Append either exactly one positional value or a mapping assembled
    /// from one or more keyword entries.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArguments` when both or neither forms are given,
    /// or more than one positional value.
    pub fn append_args<P, K, V>(&self, positional: P, keywords: K) -> Result<Value>
    where
        P: IntoIterator<Item = Value>,
        K: IntoIterator<Item = (String, V)>,
        V: Into<Value>,
    {
        let value = append_argument(positional, keywords, self.inner.flags)?;
        self.append(value)
    }

    /// Append a mapping built from keyword entries.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArguments` if `entries` is empty.
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

    /// Append every value, casting each.
    pub fn extend<I, V>(&self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.inner.flags.ensure_resizable("extend", KIND)?;
        let values = cast_values(values, self.inner.flags);
        self.inner.items.borrow_mut().extend(values);
        Ok(())
    }

    /// Insert before a signed position, clamped to the bounds.
    pub fn insert(&self, position: isize, value: impl Into<Value>) -> Result<()> {
        self.inner.flags.ensure_resizable("insert into", KIND)?;
        let value = cast(value.into(), self.inner.flags);
        let mut items = self.inner.items.borrow_mut();
        let at = resolve_insertion(position, items.len());
        items.insert(at, value);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Shrinking
    // ═══════════════════════════════════════════════════════════════════

    /// Remove the first element equal to `value`.
    ///
    /// # Errors
    ///
    /// Returns `ValueNotFound` if no element matches.
    pub fn remove(&self, value: impl Into<Value>) -> Result<()> {
        self.inner.flags.ensure_resizable("remove from", KIND)?;
        let value = value.into();
        let at = self
            .index_of(&value)
            .ok_or_else(|| TreeError::ValueNotFound(format!("{:?}", value)))?;
        self.inner.items.borrow_mut().remove(at);
        Ok(())
    }

    /// Remove and return the element at `position` (the last one if `None`).
    pub fn pop(&self, position: Option<isize>) -> Result<Value> {
        self.inner.flags.ensure_resizable("pop from", KIND)?;
        let pos = position.unwrap_or(-1);
        let mut items = self.inner.items.borrow_mut();
        let at = resolve_position(pos, items.len()).ok_or(TreeError::IndexOutOfRange {
            index: pos,
            len: items.len(),
        })?;
        Ok(items.remove(at))
    }

    /// Remove every element.
    pub fn clear(&self) -> Result<()> {
        self.inner.flags.ensure_resizable("clear", KIND)?;
        self.inner.items.borrow_mut().clear();
        Ok(())
    }

    /// Delete by position or slice.
    pub fn delete(&self, index: impl Into<Index>) -> Result<()> {
        self.inner.flags.ensure_resizable("delete from", KIND)?;
        let mut items = self.inner.items.borrow_mut();
        match index.into() {
            Index::Position(pos) => {
                let at = resolve_position(pos, items.len()).ok_or(TreeError::IndexOutOfRange {
                    index: pos,
                    len: items.len(),
                })?;
                items.remove(at);
                Ok(())
            }
            Index::Slice(slice) => {
                let range = slice.resolve(items.len());
                items.drain(range);
                Ok(())
            }
            Index::Key(key) => Err(key_on_sequence("delete", &key)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // In-place updates
    // ═══════════════════════════════════════════════════════════════════

    /// Assign by position or slice.
    ///
    /// Position writes are allowed on sealed sequences; slice writes on a
    /// sealed sequence must keep its length.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for positions past either end and
    /// `TypeError` when a slice is assigned something other than a sequence.
    pub fn set(&self, index: impl Into<Index>, value: impl Into<Value>) -> Result<()> {
        self.inner.flags.ensure_mutable("assign into", KIND)?;
        match index.into() {
            Index::Position(pos) => {
                let value = cast(value.into(), self.inner.flags);
                let mut items = self.inner.items.borrow_mut();
                let len = items.len();
                let at = resolve_position(pos, len)
                    .ok_or(TreeError::IndexOutOfRange { index: pos, len })?;
                items[at] = value;
                Ok(())
            }
            Index::Slice(slice) => {
                let value = value.into();
                let replacement = match value.as_sequence() {
                    Some(seq) => cast_values(seq.to_vec(), self.inner.flags),
                    None => return Err(TreeError::type_error("sequence", &value)),
                };
                let mut items = self.inner.items.borrow_mut();
                let range = slice.resolve(items.len());
                if range.len() != replacement.len() {
                    self.inner
                        .flags
                        .ensure_resizable("resize through slice assignment", KIND)?;
                }
                items.splice(range, replacement);
                Ok(())
            }
            Index::Key(key) => Err(key_on_sequence("assign", &key)),
        }
    }

    /// Sort in place by natural order.
    pub fn sort(&self, reverse: bool) -> Result<()> {
        self.sort_by_key(Value::clone, reverse)
    }

    /// Sort in place by a derived key. The sort is stable, also when
    /// reversed.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` if two keys cannot be compared; the sequence is
    /// left untouched. NaN keys do not fail: they order after every other
    /// number (before them when the NaN is negative).
    pub fn sort_by_key<F>(&self, mut key: F, reverse: bool) -> Result<()>
    where
        F: FnMut(&Value) -> Value,
    {
        self.inner.flags.ensure_mutable("sort", KIND)?;
        let items = self.to_vec();
        let keys: Vec<Value> = items.iter().map(&mut key).collect();

        let mut order: Vec<usize> = (0..items.len()).collect();
        merge_sort(&mut order, |a, b| {
            let ordering = compare_keys(&keys[a], &keys[b])?;
            Ok(if reverse { ordering.reverse() } else { ordering })
        })?;

        let sorted = order.into_iter().map(|i| items[i].clone()).collect();
        *self.inner.items.borrow_mut() = sorted;
        Ok(())
    }

    /// Reverse in place.
    pub fn reverse(&self) -> Result<()> {
        self.inner.flags.ensure_mutable("reverse", KIND)?;
        self.inner.items.borrow_mut().reverse();
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Copies
    // ═══════════════════════════════════════════════════════════════════

    /// Shallow copy: a new sequence with the same flags sharing children.
    pub fn copy(&self) -> Self {
        Self::build(self.inner.class.clone(), self.to_vec(), self.inner.flags)
    }

    /// Deep copy: every nested node is rebuilt.
    pub fn deep_copy(&self) -> Self {
        let items = self.iter().map(deep_copy_value).collect();
        Self::build(self.inner.class.clone(), items, self.inner.flags)
    }

    fn out_of_range(&self, index: isize) -> TreeError {
        TreeError::IndexOutOfRange {
            index,
            len: self.len(),
        }
    }
}

/// Validate the arguments of a keyword-or-positional append and produce
/// the value to append.
pub(super) fn append_argument<P, K, V>(positional: P, keywords: K, flags: Flags) -> Result<Value>
where
    P: IntoIterator<Item = Value>,
    K: IntoIterator<Item = (String, V)>,
    V: Into<Value>,
{
    let mut positional: Vec<Value> = positional.into_iter().collect();
    let keywords: Vec<(String, V)> = keywords.into_iter().collect();
    match (positional.len(), keywords.is_empty()) {
        (1, true) => Ok(positional.remove(0)),
        (0, false) => Ok(Value::Mapping(Mapping::from_entries(keywords, flags))),
        _ => Err(TreeError::InvalidArguments(
            "append takes either one positional value or one-to-many keyword entries".to_string(),
        )),
    }
}

fn key_on_sequence(operation: &str, key: &str) -> TreeError {
    TreeError::ShapeConflict {
        operation: format!("{} with key {:?} (indices must be integers or slices)", operation, key),
        kind: KIND.to_string(),
    }
}

fn cast_values<I, V>(values: I, flags: Flags) -> Vec<Value>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    values.into_iter().map(|v| cast(v.into(), flags)).collect()
}

impl Container for Sequence {
    fn flags(&self) -> Flags {
        self.inner.flags
    }

    fn class(&self) -> Option<Rc<dyn NodeClass>> {
        self.inner.class.clone()
    }

    fn rebuild(&self, flags: Flags) -> Self {
        Self::build(
            self.inner.class.clone(),
            cast_values(self.to_vec(), flags),
            flags,
        )
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.inner.items.borrow() == *other.inner.items.borrow()
    }
}

impl<V: Into<Value>> FromIterator<V> for Sequence {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from_values(iter, Flags::default())
    }
}

/// Natural order of two sort keys. Numbers that `partial_cmp` rejects
/// (NaN) fall back to the IEEE total order.
fn compare_keys(a: &Value, b: &Value) -> Result<Ordering> {
    if let Some(ordering) = a.partial_cmp(b) {
        return Ok(ordering);
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => Ok(x.total_cmp(&y)),
        _ => Err(TreeError::TypeError {
            expected: "mutually comparable sort keys".to_string(),
            got: format!("{} and {}", type_name(a), type_name(b)),
        }),
    }
}

/// Stable bottom-up merge sort with a fallible comparator. Stops at the
/// first failed comparison and leaves `order` unspecified in that case.
fn merge_sort<F>(order: &mut Vec<usize>, mut compare: F) -> Result<()>
where
    F: FnMut(usize, usize) -> Result<Ordering>,
{
    let len = order.len();
    let mut merged = Vec::with_capacity(len);
    let mut width = 1;
    while width < len {
        merged.clear();
        for start in (0..len).step_by(2 * width) {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right) = (start, mid);
            while left < mid && right < end {
                // Taking from the right only when strictly smaller keeps ties in place.
                if compare(order[right], order[left])? == Ordering::Less {
                    merged.push(order[right]);
                    right += 1;
                } else {
                    merged.push(order[left]);
                    left += 1;
                }
            }
            merged.extend_from_slice(&order[left..mid]);
            merged.extend_from_slice(&order[right..end]);
        }
        std::mem::swap(order, &mut merged);
        width *= 2;
    }
    Ok(())
}
