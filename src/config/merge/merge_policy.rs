//! Built-in defaults every config load starts from.

use crate::config::DEFAULT_MENU_NAME;
use crate::state::{DEFAULT_MAP_KEY, DEFAULT_STRUCTURE_KEY};
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

/// Builder seeded with defaults so partial files still deserialize.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("menu.name", DEFAULT_MENU_NAME)?
        .set_default("menu.structure_key", DEFAULT_STRUCTURE_KEY)?
        .set_default("menu.map_key", DEFAULT_MAP_KEY)?
        .set_default("source.order", "hierarchical")
}
