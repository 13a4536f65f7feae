//! # Sapling
//!
//! Dynamic trees of mappings and sequences that grow on write.
//!
//! Reading a key that does not exist yields an undefined reference instead
//! of an error. References chain (`a.b.c`) and hold no data. The first write
//! through a chain materializes every missing node along it, as a mapping
//! or a sequence depending on the write.
//!
//! ```
//! use sapling::{dumps, tree, DumpOptions};
//!
//! let config = tree();
//! let axis = config.at("axes").unwrap().append(sapling::Mapping::new()).unwrap();
//! axis.at("label").unwrap().set("text", "time").unwrap();
//!
//! assert_eq!(
//!     dumps(&config, &DumpOptions::compact()).unwrap(),
//!     r#"{"axes":[{"label":{"text":"time"}}]}"#
//! );
//! ```
//!
//! ## Architecture
//!
//! - **Caster** ([`cast()`]): brings any value into tree form with given flags
//! - **Nodes** ([`Mapping`], [`Sequence`]): shared containers with guarded mutation
//! - **Undefined references** ([`Undefined`]): lazy placeholders for absent keys
//! - **Flags** ([`Flags`]): sealed/frozen mutation policy
//! - **JSON** ([`loads`], [`dumps`]): plain JSON in and out
//!
//! Trees are single-threaded: nodes are `Rc`-shared and not `Send`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cast;
pub mod error;
pub mod flags;
pub mod index;
pub mod json;
pub mod scope;
pub mod tree;
pub mod value;

// Re-export main types
pub use cast::cast;
pub use error::{type_name, Result, TreeError};
pub use flags::{Flags, Lock};
pub use index::{Index, Slice};
pub use json::{dump, dumps, load, loads, to_json, DumpOptions};
pub use scope::Scope;
pub use tree::{freeze, frozen, new, seal, sealed, tree, unfreeze, unseal};
pub use value::{Container, Mapping, NodeClass, NodeKind, Sequence, Undefined, Value};

/// Sapling version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
