//! Page and menu item node types.
//!
//! Pages form the source tree owned by the external content store. Menu items
//! form the derived tree owned by the menu store and kept in sync with it.

pub mod node;

pub use node::{DerivedNode, ItemFields, ItemStatus, ObjectKind, PageStatus, SourceNode};
