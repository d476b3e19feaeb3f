//! Global config file: $XDG_CONFIG_HOME/menu-sync/config.toml

use crate::config::xdg;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let Ok(config_home) = xdg::config_home() else {
        return Ok(builder);
    };
    let path = config_home.join("menu-sync").join("config.toml");
    if !path.exists() {
        return Ok(builder);
    }
    Ok(builder.add_source(File::from(path).required(false)))
}
