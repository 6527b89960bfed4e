use catalogue_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("App not found: {0}")]
    AppNotFound(String),

    #[error("Action not found: {app}.{action}")]
    ActionNotFound { app: String, action: String },

    #[error("Option '{option}' not found on {app}.{action}")]
    OptionNotFound {
        app: String,
        action: String,
        option: String,
    },

    #[error("Action {0} is dispatched by the host's REST executor and cannot be invoked here")]
    NotInvocable(String),

    #[error("Host rejected registration of {item}: {source}")]
    Host {
        item: String,
        #[source]
        source: anyhow::Error,
    },

    /// Failure raised by a resolver or action function, passed through as is
    #[error(transparent)]
    Resolver(anyhow::Error),
}

impl RegistryError {
    pub fn action_not_found(app: &str, action: &str) -> Self {
        RegistryError::ActionNotFound {
            app: app.to_string(),
            action: action.to_string(),
        }
    }
}

impl From<RegistryError> for CoreError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::AppNotFound(_)
            | RegistryError::ActionNotFound { .. }
            | RegistryError::OptionNotFound { .. } => CoreError::NotFound(err.to_string()),
            other => CoreError::Invalid(other.to_string()),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
