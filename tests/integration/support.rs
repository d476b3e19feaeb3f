//! Shared fixtures

use menu_sync::state::StateKeys;
use menu_sync::store::memory::{MemoryMenuStore, MemoryPageSource, MemoryStateStore, PageOrder};
use menu_sync::store::MenuStore;
use menu_sync::{DerivedNode, EventAdapter, SourceNode, TreeSyncEngine};
use std::sync::Arc;

pub const MENU: &str = "Synced Menu";

/// In-memory stores wired together the way a host would wire real ones
pub struct Harness {
    pub menus: Arc<MemoryMenuStore>,
    pub state: Arc<MemoryStateStore>,
    pub pages: Arc<MemoryPageSource>,
}

impl Harness {
    pub fn new(pages: Vec<SourceNode>) -> Self {
        Self::with_order(pages, PageOrder::Insertion)
    }

    pub fn with_order(pages: Vec<SourceNode>, order: PageOrder) -> Self {
        Self {
            menus: Arc::new(MemoryMenuStore::new()),
            state: Arc::new(MemoryStateStore::new()),
            pages: Arc::new(MemoryPageSource::new(pages, order)),
        }
    }

    pub fn engine(&self) -> TreeSyncEngine {
        TreeSyncEngine::new(self.menus.clone())
    }

    pub fn adapter(&self) -> EventAdapter {
        EventAdapter::new(
            self.menus.clone(),
            self.state.clone(),
            self.pages.clone(),
            StateKeys::default(),
        )
    }

    pub fn controller(&self) -> menu_sync::BootstrapController {
        menu_sync::BootstrapController::new(
            MENU,
            self.menus.clone(),
            self.pages.clone(),
            self.state.clone(),
            StateKeys::default(),
        )
    }

    pub fn item(&self, id: u64) -> DerivedNode {
        self.menus
            .item(id)
            .unwrap()
            .unwrap_or_else(|| panic!("menu item {} missing", id))
    }
}

/// The two-page site used throughout: Home with About beneath it
pub fn home_and_about() -> Vec<SourceNode> {
    vec![
        SourceNode::published(1, "Home", None, 0),
        SourceNode::published(2, "About", Some(1), 0),
    ]
}
