//! Server-side errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    #[error("plugin {0} is already registered")]
    DuplicatePlugin(String),

    #[error("plugin {plugin} requires {dependency}, which is not installed")]
    MissingDependency { plugin: String, dependency: String },

    #[error("dependency cycle between plugins: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
}
