use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown type '{name}' at '{path}'")]
    UnknownType { name: String, path: String },

    #[error("invalid type description at '{path}': {reason}")]
    InvalidTypeDescription { path: String, reason: String },

    #[error("schema resolution failed: {0}")]
    SchemaResolution(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid: {0}")]
    Invalid(String),

    #[error("serde error: {0}")]
    Serde(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serde(e.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
