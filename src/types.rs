//! Core identifier types for the menu synchronization system.

/// SourceId: Identifier of a page, assigned by the page store
pub type SourceId = u64;

/// DerivedId: Identifier of a menu item, assigned by the menu store
pub type DerivedId = u64;

/// StructureId: Identifier of a menu
pub type StructureId = u64;
