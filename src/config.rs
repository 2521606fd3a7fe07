// src/config.rs

//! Configuration loading utilities.
//!
//! Settings default when no file is given. A settings file that is given and
//! the channel file are both strict.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{CollectionConfig, Config};

/// Load runtime settings from an explicit file, or use defaults without one.
pub fn load_settings(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        log::debug!("No settings file given, using defaults");
        return Ok(Config::default());
    };

    Config::load(path).map_err(|e| {
        AppError::config(format!("Cannot load settings from {}: {e}", path.display()))
    })
}

/// Load the collections of a channel file in file order.
pub fn load_collections(path: &Path) -> Result<Vec<CollectionConfig>> {
    let collections = CollectionConfig::load_all(path)?;
    log::info!(
        "Loaded {} collections from {}",
        collections.len(),
        path.display()
    );
    Ok(collections)
}

/// Load and validate settings and the channel file.
pub fn load_all(
    settings: Option<&Path>,
    channel_file: &Path,
) -> Result<(Config, Vec<CollectionConfig>)> {
    let config = load_settings(settings)?;
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid settings: {e}")))?;

    let collections = load_collections(channel_file)?;
    Ok((config, collections))
}
