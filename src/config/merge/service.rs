//! MergeService: orchestrates sources, applies merge policy, deserializes to MenuSyncConfig.

use crate::config::sources::{environment, global_file, workspace_file};
use crate::config::MenuSyncConfig;
use crate::error::ApiError;
use config::ConfigError;
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from workspace and standard sources.
    /// Precedence: global file (lowest) -> workspace file -> environment (highest).
    pub fn load(workspace_root: &Path) -> Result<MenuSyncConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<MenuSyncConfig, ApiError> {
        use config::File;

        let path_str = path.to_str().ok_or_else(|| {
            ApiError::ConfigError(format!("Config path is not valid UTF-8: {:?}", path))
        })?;
        let builder = merge_policy::builder_with_defaults()?;
        let builder = builder.add_source(File::with_name(path_str));
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
