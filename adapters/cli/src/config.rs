//! Loading of the game configuration from TOML.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use delve_system_session::GameConfig;

/// Reads the configuration file, or returns defaults when none is given.
pub(crate) fn load(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid config {}", path.display()))
}

pub(crate) fn parse(text: &str) -> Result<GameConfig> {
    Ok(toml::from_str(text)?)
}
