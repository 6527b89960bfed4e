use catalogue_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum PieceError {
    #[error("unsupported auth kind '{0}'")]
    UnsupportedAuth(String),

    #[error("property '{property}': {source}")]
    Property {
        property: String,
        #[source]
        source: CoreError,
    },

    #[error("response type: {0}")]
    ResponseType(#[source] CoreError),
}

impl From<PieceError> for CoreError {
    fn from(err: PieceError) -> Self {
        match err {
            PieceError::Property { source, .. } => source,
            PieceError::ResponseType(source) => source,
            other => CoreError::Invalid(other.to_string()),
        }
    }
}

pub type PieceResult<T> = Result<T, PieceError>;
