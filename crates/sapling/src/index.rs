//! Addressing nodes by key, position or slice

use std::fmt;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

/// An address into a node.
///
/// Mappings are addressed by [`Index::Key`]; sequences by a signed
/// [`Index::Position`] (negative counts from the end) or a [`Slice`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Index {
    /// Mapping key
    Key(String),

    /// Sequence position
    Position(isize),

    /// Sequence slice
    Slice(Slice),
}

impl Index {
    /// Whether this index could only address a sequence.
    pub fn is_positional(&self) -> bool {
        matches!(self, Index::Position(_) | Index::Slice(_))
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Index::Key(key) => write!(f, "{:?}", key),
            Index::Position(pos) => write!(f, "{}", pos),
            Index::Slice(slice) => write!(f, "{}", slice),
        }
    }
}

/// A half-open slice with optional, possibly negative bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Slice {
    /// Start bound (inclusive)
    pub start: Option<isize>,

    /// Stop bound (exclusive)
    pub stop: Option<isize>,
}

impl Slice {
    /// Create a slice from optional bounds.
    pub fn new(start: Option<isize>, stop: Option<isize>) -> Self {
        Self { start, stop }
    }

    /// Clamp the slice against a length, like native list slicing.
    ///
    /// The result is always a valid (possibly empty) range of `0..len`.
    pub fn resolve(&self, len: usize) -> Range<usize> {
        let start = clamp(self.start, len, 0);
        let stop = clamp(self.stop, len, len);
        start..stop.max(start)
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{}", start)?;
        }
        write!(f, ":")?;
        if let Some(stop) = self.stop {
            write!(f, "{}", stop)?;
        }
        Ok(())
    }
}

fn clamp(bound: Option<isize>, len: usize, default: usize) -> usize {
    match bound {
        None => default,
        Some(b) if b < 0 => len.saturating_sub(b.unsigned_abs()),
        Some(b) => (b as usize).min(len),
    }
}

/// Resolve a signed position against a length.
///
/// Returns `None` when the position is out of range.
pub fn resolve_position(position: isize, len: usize) -> Option<usize> {
    let idx = if position < 0 {
        len.checked_sub(position.unsigned_abs())?
    } else {
        position as usize
    };
    (idx < len).then_some(idx)
}

/// Resolve an insertion point, clamping like native `insert`.
pub fn resolve_insertion(position: isize, len: usize) -> usize {
    if position < 0 {
        len.saturating_sub(position.unsigned_abs())
    } else {
        (position as usize).min(len)
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Trait Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<&str> for Index {
    fn from(key: &str) -> Self {
        Index::Key(key.to_string())
    }
}

impl From<String> for Index {
    fn from(key: String) -> Self {
        Index::Key(key)
    }
}

impl From<&String> for Index {
    fn from(key: &String) -> Self {
        Index::Key(key.clone())
    }
}

impl From<i32> for Index {
    fn from(pos: i32) -> Self {
        Index::Position(pos as isize)
    }
}

impl From<i64> for Index {
    fn from(pos: i64) -> Self {
        Index::Position(pos as isize)
    }
}

impl From<isize> for Index {
    fn from(pos: isize) -> Self {
        Index::Position(pos)
    }
}

impl From<usize> for Index {
    fn from(pos: usize) -> Self {
        Index::Position(pos as isize)
    }
}

impl From<Slice> for Index {
    fn from(slice: Slice) -> Self {
        Index::Slice(slice)
    }
}

impl From<Range<i32>> for Index {
    fn from(range: Range<i32>) -> Self {
        Index::Slice(Slice::new(Some(range.start as isize), Some(range.end as isize)))
    }
}

impl From<Range<usize>> for Index {
    fn from(range: Range<usize>) -> Self {
        Index::Slice(Slice::new(
            Some(saturating_position(range.start)),
            Some(saturating_position(range.end)),
        ))
    }
}

// Positions beyond isize::MAX stay out of range instead of wrapping negative.
fn saturating_position(pos: usize) -> isize {
    isize::try_from(pos).unwrap_or(isize::MAX)
}

impl From<RangeFrom<i32>> for Index {
    fn from(range: RangeFrom<i32>) -> Self {
        Index::Slice(Slice::new(Some(range.start as isize), None))
    }
}

impl From<RangeTo<i32>> for Index {
    fn from(range: RangeTo<i32>) -> Self {
        Index::Slice(Slice::new(None, Some(range.end as isize)))
    }
}

impl From<RangeFull> for Index {
    fn from(_: RangeFull) -> Self {
        Index::Slice(Slice::default())
    }
}
