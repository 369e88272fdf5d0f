use std::path::Path;

use blockdrop_game::inventory::HOTBAR_SIZE;
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub plugins: PluginsSection,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    pub name: String,
    /// Hotbar slots given to each joining player.
    #[serde(default = "default_hotbar_size")]
    pub hotbar_size: usize,
}

fn default_hotbar_size() -> usize {
    HOTBAR_SIZE
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct PluginsSection {
    /// Per-plugin config files live in `<directory>/<plugin>/config.json`.
    #[serde(default = "default_plugins_directory")]
    pub directory: String,
}

fn default_plugins_directory() -> String {
    "plugins".into()
}

impl Default for PluginsSection {
    fn default() -> Self {
        Self {
            directory: default_plugins_directory(),
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}
