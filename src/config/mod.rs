//! Configuration
//!
//! Layered configuration built with the `config` crate: built-in defaults, a
//! global file, a workspace file and `MENU_SYNC_*` environment variables.

mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod workspace;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use workspace::storage_paths::StorageConfig;

use crate::logging::LoggingConfig;
use crate::state::{StateKeys, DEFAULT_MAP_KEY, DEFAULT_STRUCTURE_KEY};
use crate::store::memory::PageOrder;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MENU_NAME: &str = "Synced Menu";

fn default_menu_name() -> String {
    DEFAULT_MENU_NAME.to_string()
}

fn default_structure_key() -> String {
    DEFAULT_STRUCTURE_KEY.to_string()
}

fn default_map_key() -> String {
    DEFAULT_MAP_KEY.to_string()
}

/// Synced menu settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    /// Name of the menu kept in sync with the page tree
    #[serde(default = "default_menu_name")]
    pub name: String,

    /// State key holding the menu id
    #[serde(default = "default_structure_key")]
    pub structure_key: String,

    /// State key holding the serialized identity map
    #[serde(default = "default_map_key")]
    pub map_key: String,
}

impl MenuConfig {
    pub fn state_keys(&self) -> StateKeys {
        StateKeys {
            structure_key: self.structure_key.clone(),
            map_key: self.map_key.clone(),
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            name: default_menu_name(),
            structure_key: default_structure_key(),
            map_key: default_map_key(),
        }
    }
}

/// Page source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Listing order of published pages: hierarchical or insertion
    #[serde(default)]
    pub order: PageOrder,
}

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuSyncConfig {
    #[serde(default)]
    pub menu: MenuConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
