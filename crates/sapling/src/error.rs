//! Error types for tree operations

use thiserror::Error;

use crate::flags::Lock;
use crate::value::Value;

/// Main error type for Sapling operations
#[derive(Error, Debug)]
pub enum TreeError {
    /// A node was used as the wrong kind (e.g. keyed access on a sequence)
    #[error("Shape conflict: {kind} node does not support {operation}")]
    ShapeConflict {
        /// The attempted operation
        operation: String,
        /// Kind of the offending node
        kind: String,
    },

    /// An undefined node was addressed by position before its kind was known
    #[error(
        "Ambiguous node type: cannot {operation} an undefined node at {index}; \
         cast it to a mapping or a sequence to disambiguate"
    )]
    Ambiguous {
        /// The attempted operation
        operation: String,
        /// The integer or slice index used
        index: String,
    },

    /// Mutation of a sealed or frozen node
    #[error("Policy violation: cannot {operation} a {lock} {kind} node")]
    Locked {
        /// The attempted operation
        operation: String,
        /// The lock that rejected it
        lock: Lock,
        /// Kind of the locked node
        kind: String,
    },

    /// Key lookup failed
    #[error("Key not found: {key}")]
    KeyNotFound {
        /// The missing key
        key: String,
    },

    /// Absent key read from a locked mapping, which never grows placeholders
    #[error("Key not found: {key} (a {lock} mapping does not create undefined nodes)")]
    LockedKeyNotFound {
        /// The missing key
        key: String,
        /// Lock of the mapping
        lock: Lock,
    },

    /// Sequence position out of range
    #[error("Index out of range: index {index} for length {len}")]
    IndexOutOfRange {
        /// The requested index
        index: isize,
        /// The sequence length
        len: usize,
    },

    /// `remove` did not find the value
    #[error("Value not found in sequence: {0}")]
    ValueNotFound(String),

    /// Malformed arguments to a mutation
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Type mismatch error
    #[error("Type error: expected {expected}, got {got}")]
    TypeError {
        /// Expected type
        expected: String,
        /// Actual type received
        got: String,
    },

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TreeError {
    pub(crate) fn shape(operation: impl Into<String>, value: &Value) -> Self {
        TreeError::ShapeConflict {
            operation: operation.into(),
            kind: type_name(value).to_string(),
        }
    }

    pub(crate) fn type_error(expected: impl Into<String>, value: &Value) -> Self {
        TreeError::TypeError {
            expected: expected.into(),
            got: type_name(value).to_string(),
        }
    }
}

/// Result type alias for Sapling operations
pub type Result<T> = std::result::Result<T, TreeError>;

/// Get a human-readable type name for a value.
///
/// Undefined references report the kind they currently resolve to.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::Mapping(_) => "mapping",
        Value::Sequence(_) => "sequence",
        Value::Undefined(u) => match u.resolve() {
            Some(resolved) => type_name(&resolved),
            None => "undefined",
        },
    }
}
