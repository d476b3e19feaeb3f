//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::MenuSyncConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from files and environment.
    pub fn load(workspace_root: &Path) -> Result<MenuSyncConfig, ApiError> {
        Ok(MergeService::load(workspace_root)?)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<MenuSyncConfig, ApiError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> MenuSyncConfig {
        MenuSyncConfig::default()
    }
}
