//! User-defined node classes

use std::any::Any;
use std::fmt;

/// A user-defined class attached to a mapping or sequence node.
///
/// Classes survive casting, copying and flag changes, so code wrapping a
/// node can recognize its own nodes anywhere in a tree.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::rc::Rc;
/// use sapling::{freeze, Flags, Mapping, NodeClass, Value};
///
/// #[derive(Debug)]
/// struct Person;
///
/// impl NodeClass for Person {
///     fn name(&self) -> &str {
///         "Person"
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let bob = Mapping::with_class(Rc::new(Person), [("name", "Bob")], Flags::default());
/// let frozen = freeze(&Value::Mapping(bob)).unwrap();
/// assert!(frozen.as_mapping().unwrap().is_instance::<Person>());
/// ```
pub trait NodeClass: fmt::Debug {
    /// Class name, used in diagnostics.
    fn name(&self) -> &str;

    /// Upcast for downcasting to the concrete class.
    fn as_any(&self) -> &dyn Any;
}
