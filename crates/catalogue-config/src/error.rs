use catalogue_core::CoreError;
use catalogue_swagger::SwaggerError;

use crate::env_resolver::EnvResolverError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Environment resolution error: {0}")]
    Env(#[from] EnvResolverError),

    #[error("Swagger error: {0}")]
    Swagger(#[from] SwaggerError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

impl From<ConfigError> for CoreError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => CoreError::Invalid(e.to_string()),
            ConfigError::Yaml(e) => CoreError::Serde(e.to_string()),
            ConfigError::Json(e) => CoreError::Serde(e.to_string()),
            ConfigError::Swagger(e) => e.into(),
            ConfigError::Core(e) => e,
            other => CoreError::Invalid(other.to_string()),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
