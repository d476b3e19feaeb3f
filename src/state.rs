//! Persisted sync state
//!
//! The menu id and the identity map live in the durable key-value store under
//! two well-known keys. They are read fresh on every invocation and never
//! cached in memory between invocations.

use crate::error::StorageError;
use crate::identity::IdentityMap;
use crate::store::StateStore;
use crate::types::StructureId;
use serde::{Deserialize, Serialize};

pub const DEFAULT_STRUCTURE_KEY: &str = "menu_sync_menu_id";
pub const DEFAULT_MAP_KEY: &str = "menu_sync_page_map";

/// Names of the keys holding sync state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateKeys {
    pub structure_key: String,
    pub map_key: String,
}

impl Default for StateKeys {
    fn default() -> Self {
        Self {
            structure_key: DEFAULT_STRUCTURE_KEY.to_string(),
            map_key: DEFAULT_MAP_KEY.to_string(),
        }
    }
}

/// Sync state as loaded at the start of an invocation
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    pub structure_id: Option<StructureId>,
    pub identity_map: Option<IdentityMap>,
}

impl SyncState {
    /// Load both values; unreadable values are logged and treated as absent.
    pub fn load(store: &dyn StateStore, keys: &StateKeys) -> Result<Self, StorageError> {
        Ok(Self {
            structure_id: load_structure_id(store, keys)?,
            identity_map: load_identity_map(store, keys)?,
        })
    }
}

pub fn load_structure_id(
    store: &dyn StateStore,
    keys: &StateKeys,
) -> Result<Option<StructureId>, StorageError> {
    let Some(raw) = store.get(&keys.structure_key)? else {
        return Ok(None);
    };
    let parsed = std::str::from_utf8(&raw)
        .ok()
        .and_then(|s| s.trim().parse::<StructureId>().ok());
    if parsed.is_none() {
        tracing::warn!(key = %keys.structure_key, "Stored menu id is not a number, ignoring");
    }
    Ok(parsed)
}

pub fn load_identity_map(
    store: &dyn StateStore,
    keys: &StateKeys,
) -> Result<Option<IdentityMap>, StorageError> {
    let Some(raw) = store.get(&keys.map_key)? else {
        return Ok(None);
    };
    match IdentityMap::deserialize(&raw) {
        Ok(map) => Ok(Some(map)),
        Err(e) => {
            tracing::warn!(key = %keys.map_key, "Failed to decode identity map: {}", e);
            Ok(None)
        }
    }
}

pub fn persist_structure_id(
    store: &dyn StateStore,
    keys: &StateKeys,
    structure_id: StructureId,
) -> Result<(), StorageError> {
    store.set(&keys.structure_key, structure_id.to_string().as_bytes())
}

pub fn persist_identity_map(
    store: &dyn StateStore,
    keys: &StateKeys,
    map: &IdentityMap,
) -> Result<(), StorageError> {
    store.set(&keys.map_key, &map.serialize()?)
}
