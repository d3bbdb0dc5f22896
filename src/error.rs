use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("not logged in: run `clinic-console login` first")]
    NotLoggedIn,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("invalid sort field '{0}'")]
    InvalidSortField(String),

    #[error("invalid sort order '{0}', expected 'asc' or 'desc'")]
    InvalidSortOrder(String),

    #[error("invalid shift '{0}', expected MORNING, AFTERNOON, EVENING or NIGHT")]
    InvalidShift(String),

    #[error("invalid role '{0}'")]
    InvalidRole(String),

    #[error("invalid queue action '{0}'")]
    InvalidAction(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("{0}")]
    Other(String),
}

impl From<ValidationErrors> for ConsoleError {
    fn from(errors: ValidationErrors) -> Self {
        ConsoleError::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
