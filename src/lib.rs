//! Menu Sync: keep a navigation menu in step with a page hierarchy
//!
//! Mirrors a tree of published pages into a menu, maintaining parent/child
//! links and ordering incrementally as pages change, with a persisted identity
//! map from pages to menu items.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod logging;
pub mod state;
pub mod store;
pub mod sync;
pub mod tooling;
pub mod tree;
pub mod types;

pub use bootstrap::{BootstrapController, BootstrapOutcome};
pub use events::{EventAdapter, PageEvent};
pub use identity::IdentityMap;
pub use sync::{FullSyncReport, IncrementalSync, SkipReason, SyncOutcome, TreeSyncEngine};
pub use tree::{DerivedNode, PageStatus, SourceNode};
