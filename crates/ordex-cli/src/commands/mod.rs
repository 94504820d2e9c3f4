//! CLI subcommands.

pub mod config;
pub mod inspect;
pub mod run;

use std::path::Path;

use ordex_core::OrdexConfig;

/// Load the config from an explicit path, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<OrdexConfig> {
    match config_path {
        Some(path) => Ok(OrdexConfig::from_file(Path::new(path))?),
        None => Ok(OrdexConfig::default()),
    }
}
