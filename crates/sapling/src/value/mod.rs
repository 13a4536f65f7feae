//! Value representation for tree nodes

mod class;
mod display;
mod impls;
mod mapping;
mod sequence;
mod undefined;

pub use class::NodeClass;
pub use mapping::Mapping;
pub use sequence::Sequence;
pub use undefined::Undefined;

use std::rc::Rc;

use crate::flags::Flags;

/// A value in a tree.
///
/// Values are organized into three tiers:
/// - Scalars: null, booleans, numbers and strings
/// - Containers: shared mapping and sequence nodes
/// - Placeholders: undefined references to absent keys
///
/// Cloning a container clones the handle, not the data. Containers never
/// store an [`Undefined`]: the caster replaces it with what it resolves to.
#[derive(Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Scalars
    // ═══════════════════════════════════════════════════════════════════
    /// JSON `null`
    Null,

    /// Boolean: `true` or `false`
    Bool(bool),

    /// Integer
    Int(i64),

    /// Floating point
    Float(f64),

    /// String
    String(String),

    // ═══════════════════════════════════════════════════════════════════
    // Containers
    // ═══════════════════════════════════════════════════════════════════
    /// Ordered key/value node
    Mapping(Mapping),

    /// Ordered sequence node
    Sequence(Sequence),

    // ═══════════════════════════════════════════════════════════════════
    // Placeholders
    // ═══════════════════════════════════════════════════════════════════
    /// Reference to a node that does not exist yet
    Undefined(Undefined),
}

/// The two container shapes a node can materialize into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A [`Mapping`]
    Mapping,

    /// A [`Sequence`]
    Sequence,
}

impl NodeKind {
    /// Create an empty node of this kind.
    pub fn create(self, flags: Flags) -> Value {
        match self {
            NodeKind::Mapping => Value::Mapping(Mapping::with_flags(flags)),
            NodeKind::Sequence => Value::Sequence(Sequence::with_flags(flags)),
        }
    }

    /// Whether `value` is a container of this kind.
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (NodeKind::Mapping, Value::Mapping(_)) | (NodeKind::Sequence, Value::Sequence(_))
        )
    }
}

/// Capabilities shared by mapping and sequence nodes.
///
/// The caster relies on [`Container::rebuild`] instead of a concrete
/// constructor, so nodes carrying a [`NodeClass`] keep it.
pub trait Container: Sized {
    /// The node's mutation policy.
    fn flags(&self) -> Flags;

    /// The node's class, if any.
    fn class(&self) -> Option<Rc<dyn NodeClass>>;

    /// A new node with the same class and the given flags, every child
    /// recursively cast to those flags.
    fn rebuild(&self, flags: Flags) -> Self;

    /// Whether both handles point at the same node.
    fn ptr_eq(&self, other: &Self) -> bool;
}
