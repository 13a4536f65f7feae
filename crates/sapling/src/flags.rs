//! Mutation policy configuration and guards

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TreeError};

/// Mutation policy of a mapping or sequence node.
///
/// Flags are fixed for the lifetime of a node; changing them means
/// rebuilding the node (see [`crate::freeze`] and friends). Children always
/// carry the flags of the container that stores them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    /// Existing entries may be read and overwritten, but never added or removed
    pub sealed: bool,

    /// No mutation at all
    pub frozen: bool,
}

impl Flags {
    /// Create flags from explicit values.
    pub const fn new(sealed: bool, frozen: bool) -> Self {
        Self { sealed, frozen }
    }

    /// Sealed, not frozen.
    pub const fn sealed() -> Self {
        Self::new(true, false)
    }

    /// Frozen, not sealed.
    pub const fn frozen() -> Self {
        Self::new(false, true)
    }

    /// Copy with the sealed flag replaced.
    pub const fn with_sealed(self, sealed: bool) -> Self {
        Self { sealed, ..self }
    }

    /// Copy with the frozen flag replaced.
    pub const fn with_frozen(self, frozen: bool) -> Self {
        Self { frozen, ..self }
    }

    /// The lock that applies to reads of absent keys, if any.
    ///
    /// Frozen takes precedence over sealed.
    pub fn lock(&self) -> Option<Lock> {
        if self.frozen {
            Some(Lock::Frozen)
        } else if self.sealed {
            Some(Lock::Sealed)
        } else {
            None
        }
    }

    /// Guard for operations that modify contents without changing size
    /// (overwrites, sorting, reversing).
    pub(crate) fn ensure_mutable(&self, operation: &str, kind: &str) -> Result<()> {
        if self.frozen {
            return Err(rejected(operation, Lock::Frozen, kind));
        }
        Ok(())
    }

    /// Guard for operations that add or remove entries.
    pub(crate) fn ensure_resizable(&self, operation: &str, kind: &str) -> Result<()> {
        self.ensure_mutable(operation, kind)?;
        if self.sealed {
            return Err(rejected(operation, Lock::Sealed, kind));
        }
        Ok(())
    }
}

fn rejected(operation: &str, lock: Lock, kind: &str) -> TreeError {
    tracing::trace!(operation, %lock, kind, "mutation rejected by policy");
    TreeError::Locked {
        operation: operation.to_string(),
        lock,
        kind: kind.to_string(),
    }
}

/// The kind of lock that rejected an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lock {
    /// Size is fixed
    Sealed,

    /// Contents are fixed
    Frozen,
}

impl fmt::Display for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lock::Sealed => write!(f, "sealed"),
            Lock::Frozen => write!(f, "frozen"),
        }
    }
}
