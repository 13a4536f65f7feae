//! Scoped access to a node
//!
//! A block-shaped way to write chained construction code. Nothing is
//! acquired, so leaving the scope releases nothing.

use std::ops::Deref;

use crate::value::Value;

/// Guard that dereferences to the entered value.
///
/// Entering an undefined reference yields the node it resolves to, or the
/// reference itself while it is still unresolved.
///
/// # Example
///
/// ```
/// use sapling::{Mapping, Value};
///
/// let root = Value::Mapping(Mapping::new());
/// root.at("a").unwrap().at("b").unwrap().set("c", 1).unwrap();
///
/// {
///     let a = root.at("a").unwrap();
///     let scope = a.scope();
///     // `a` was materialized by the write above
///     assert!(scope.is_mapping());
///     scope.set("d", 2).unwrap();
/// }
/// assert_eq!(root.get_path(["a", "d"]).unwrap(), 2);
/// ```
pub struct Scope<'a> {
    origin: &'a Value,
    entered: Value,
}

impl Value {
    /// Enter this value as a scope.
    pub fn scope(&self) -> Scope<'_> {
        Scope {
            origin: self,
            entered: self.enter(),
        }
    }
}

impl<'a> Scope<'a> {
    /// The value the scope was entered from.
    pub fn origin(&self) -> &'a Value {
        self.origin
    }

    /// Leave the scope, keeping the entered value.
    pub fn into_inner(self) -> Value {
        self.entered
    }
}

impl<'a> Deref for Scope<'a> {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.entered
    }
}
