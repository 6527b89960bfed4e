//! Error types for the CLI

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] catalogue_config::ConfigError),

    #[error("Registry error: {0}")]
    Registry(#[from] catalogue_registry::RegistryError),

    #[error("Swagger error: {0}")]
    Swagger(#[from] catalogue_swagger::SwaggerError),

    #[error("Catalogue error: {0}")]
    Core(#[from] catalogue_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Catalogue build reported {0} error(s)")]
    BuildFailed(usize),

    #[error("General error: {0}")]
    General(String),
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::General(err.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
