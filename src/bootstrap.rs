//! Bootstrap Controller
//!
//! Creates the synced menu the first time it is needed and seeds it with a
//! full sync of the published page tree. Safe to call on every lifecycle tick.

use crate::error::StorageError;
use crate::identity::IdentityMap;
use crate::state::{self, StateKeys, SyncState};
use crate::store::{MenuStore, PageSource, StateStore};
use crate::sync::{FullSyncReport, TreeSyncEngine};
use crate::types::StructureId;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of [`BootstrapController::ensure_structure_exists`]
#[derive(Debug, Clone)]
pub enum BootstrapOutcome {
    /// The menu and its state were already there; nothing was touched
    AlreadyExists(StructureId),
    /// The menu was created and seeded
    Created {
        structure_id: StructureId,
        report: FullSyncReport,
    },
    /// The menu existed but its id or identity map was not persisted; the
    /// state was rewritten and the map reseeded
    Repaired {
        structure_id: StructureId,
        report: FullSyncReport,
    },
}

impl BootstrapOutcome {
    pub fn structure_id(&self) -> StructureId {
        match self {
            BootstrapOutcome::AlreadyExists(id) => *id,
            BootstrapOutcome::Created { structure_id, .. }
            | BootstrapOutcome::Repaired { structure_id, .. } => *structure_id,
        }
    }
}

pub struct BootstrapController {
    menu_name: String,
    menus: Arc<dyn MenuStore>,
    pages: Arc<dyn PageSource>,
    state: Arc<dyn StateStore>,
    keys: StateKeys,
    engine: TreeSyncEngine,
}

impl BootstrapController {
    pub fn new(
        menu_name: impl Into<String>,
        menus: Arc<dyn MenuStore>,
        pages: Arc<dyn PageSource>,
        state: Arc<dyn StateStore>,
        keys: StateKeys,
    ) -> Self {
        Self {
            menu_name: menu_name.into(),
            engine: TreeSyncEngine::new(Arc::clone(&menus)),
            menus,
            pages,
            state,
            keys,
        }
    }

    pub fn menu_name(&self) -> &str {
        &self.menu_name
    }

    /// Create and seed the menu unless it exists with its state in place.
    ///
    /// Pages are listed before anything is written, and the menu id is
    /// persisted as soon as the menu exists, so a failure part way through
    /// is repaired by the next call. A menu that exists without matching
    /// state gets its id persisted and a full sync reseeding the map.
    pub fn ensure_structure_exists(&self) -> Result<BootstrapOutcome, StorageError> {
        let existing = self.menus.exists(&self.menu_name)?;
        let loaded = SyncState::load(self.state.as_ref(), &self.keys)?;

        if let Some(id) = existing {
            if loaded.structure_id == Some(id) && loaded.identity_map.is_some() {
                debug!(menu = %self.menu_name, structure_id = id, "Menu already exists");
                return Ok(BootstrapOutcome::AlreadyExists(id));
            }
        }

        let pages = self.pages.list_published()?;
        let structure_id = match existing {
            Some(id) => {
                warn!(
                    menu = %self.menu_name,
                    structure_id = id,
                    "Menu exists without sync state, repairing"
                );
                id
            }
            None => self.menus.create(&self.menu_name)?,
        };
        state::persist_structure_id(self.state.as_ref(), &self.keys, structure_id)?;

        // only a menu without a usable map for it gets here
        let report = self
            .engine
            .full_sync(&pages, structure_id, IdentityMap::new())?;
        state::persist_identity_map(self.state.as_ref(), &self.keys, &report.identity_map)?;

        info!(
            menu = %self.menu_name,
            structure_id,
            pages = pages.len(),
            repaired = existing.is_some(),
            "Seeded synced menu"
        );
        Ok(match existing {
            Some(_) => BootstrapOutcome::Repaired {
                structure_id,
                report,
            },
            None => BootstrapOutcome::Created {
                structure_id,
                report,
            },
        })
    }

    /// Re-run a full sync against the persisted menu and identity map.
    ///
    /// Returns `None` without touching anything when either piece of state is
    /// missing. Existing items are rewritten in place; pages that gained a
    /// menu item since the last run are added.
    pub fn resync(&self) -> Result<Option<FullSyncReport>, StorageError> {
        let loaded = SyncState::load(self.state.as_ref(), &self.keys)?;
        let (Some(structure_id), Some(map)) = (loaded.structure_id, loaded.identity_map) else {
            warn!(menu = %self.menu_name, "Sync state missing, run bootstrap first");
            return Ok(None);
        };

        let pages = self.pages.list_published()?;
        let report = self.engine.full_sync(&pages, structure_id, map)?;
        state::persist_identity_map(self.state.as_ref(), &self.keys, &report.identity_map)?;
        Ok(Some(report))
    }
}
