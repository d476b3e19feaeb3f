//! Event Adapter
//!
//! Bridges page lifecycle notifications to the sync engine. Each call loads
//! the menu id and identity map from durable state, runs an incremental sync
//! and writes the map back only when it gained an entry.
//!
//! Two events handled concurrently may load the same map snapshot; the later
//! write then drops the earlier one's new association. Deployments are
//! single-site and low-concurrency, so this read-modify-write race is left as is.

use crate::error::StorageError;
use crate::identity::IdentityMap;
use crate::state::{self, StateKeys, SyncState};
use crate::store::{MenuStore, PageSource, StateStore};
use crate::sync::{IncrementalSync, SyncOutcome, TreeSyncEngine};
use crate::tree::SourceNode;
use std::sync::Arc;

/// Page lifecycle notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Created(SourceNode),
    Updated(SourceNode),
    Published(SourceNode),
}

impl PageEvent {
    pub fn node(&self) -> &SourceNode {
        match self {
            PageEvent::Created(node) | PageEvent::Updated(node) | PageEvent::Published(node) => {
                node
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PageEvent::Created(_) => "created",
            PageEvent::Updated(_) => "updated",
            PageEvent::Published(_) => "published",
        }
    }
}

/// Routes page events into incremental syncs
pub struct EventAdapter {
    engine: TreeSyncEngine,
    state: Arc<dyn StateStore>,
    pages: Arc<dyn PageSource>,
    keys: StateKeys,
}

impl EventAdapter {
    pub fn new(
        menus: Arc<dyn MenuStore>,
        state: Arc<dyn StateStore>,
        pages: Arc<dyn PageSource>,
        keys: StateKeys,
    ) -> Self {
        Self {
            engine: TreeSyncEngine::new(menus),
            state,
            pages,
            keys,
        }
    }

    /// Handle one event end to end.
    pub fn handle(&self, event: &PageEvent) -> Result<SyncOutcome, StorageError> {
        let node = self.current_node(event.node())?;
        tracing::debug!(
            event = event.kind(),
            page_id = node.id,
            status = node.status.as_str(),
            "Handling page event"
        );

        let loaded = self.load_state()?;
        let result = self.sync(&node, loaded)?;
        if result.changed() {
            if let Some(map) = &result.identity_map {
                self.persist_map(map)?;
            }
        }
        Ok(result.outcome)
    }

    /// Read the menu id and identity map from durable state
    pub fn load_state(&self) -> Result<SyncState, StorageError> {
        SyncState::load(self.state.as_ref(), &self.keys)
    }

    /// Run the incremental sync against an already loaded state
    pub fn sync(&self, node: &SourceNode, loaded: SyncState) -> Result<IncrementalSync, StorageError> {
        self.engine
            .incremental_sync(node, loaded.structure_id, loaded.identity_map)
    }

    /// Overwrite the persisted identity map
    pub fn persist_map(&self, map: &IdentityMap) -> Result<(), StorageError> {
        state::persist_identity_map(self.state.as_ref(), &self.keys, map)
    }

    /// The page store's status wins over the event payload when it knows the page.
    fn current_node(&self, node: &SourceNode) -> Result<SourceNode, StorageError> {
        let mut node = node.clone();
        if let Some(status) = self.pages.status(node.id)? {
            node.status = status;
        }
        Ok(node)
    }
}
