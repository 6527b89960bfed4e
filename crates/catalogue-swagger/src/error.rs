use catalogue_core::{CoreError, HttpMethod};

#[derive(Debug, thiserror::Error)]
pub enum SwaggerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported swagger version '{0}', expected 2.0")]
    UnsupportedVersion(String),

    #[error("schema resolution failed: {0}")]
    SchemaResolution(String),

    #[error("operation {method} {path} not found")]
    OperationNotFound { path: String, method: HttpMethod },

    #[error("duplicate action '{0}'")]
    DuplicateAction(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SwaggerError {
    pub fn resolution<S: Into<String>>(msg: S) -> Self {
        SwaggerError::SchemaResolution(msg.into())
    }
}

impl From<SwaggerError> for CoreError {
    fn from(err: SwaggerError) -> Self {
        match err {
            SwaggerError::Core(e) => e,
            SwaggerError::SchemaResolution(msg) => CoreError::SchemaResolution(msg),
            SwaggerError::OperationNotFound { path, method } => {
                CoreError::NotFound(format!("operation {method} {path}"))
            }
            SwaggerError::DuplicateAction(name) => {
                CoreError::Conflict(format!("duplicate action '{name}'"))
            }
            SwaggerError::Json(e) => CoreError::Serde(e.to_string()),
            SwaggerError::Yaml(e) => CoreError::Serde(e.to_string()),
            other => CoreError::Invalid(other.to_string()),
        }
    }
}

pub type SwaggerResult<T> = Result<T, SwaggerError>;
