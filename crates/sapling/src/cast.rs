//! Casting values into tree nodes

use crate::flags::Flags;
use crate::value::{Container, Value};

/// Cast a value to the tree's native representation with the given flags.
///
/// - Nodes whose flags already match are returned as-is (same instance).
/// - Nodes with other flags are rebuilt, keeping their class, with every
///   child cast recursively.
/// - Undefined references become the node they resolve to, or `Null`.
/// - Scalars pass through unchanged.
///
/// Raw data (`serde_json::Value`, `Vec`, maps) becomes a node through the
/// `From` conversions on [`Value`] before it reaches the caster.
pub fn cast(value: Value, flags: Flags) -> Value {
    match value {
        Value::Mapping(mapping) => Value::Mapping(recast(mapping, flags)),
        Value::Sequence(sequence) => Value::Sequence(recast(sequence, flags)),
        Value::Undefined(undefined) => match undefined.resolve() {
            Some(resolved) => cast(resolved, flags),
            None => Value::Null,
        },
        scalar => scalar,
    }
}

fn recast<C: Container>(node: C, flags: Flags) -> C {
    if node.flags() == flags {
        return node;
    }
    tracing::trace!(?flags, "rebuilding node with new flags");
    node.rebuild(flags)
}
