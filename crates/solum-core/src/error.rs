use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolumError {
    #[error("{0}")]
    Validation(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("multiple {kind}s named '{name}' ({count} matches): use the uuid instead")]
    MultipleFound {
        kind: &'static str,
        name: String,
        count: usize,
    },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("could not parse response from {resource} API resource: {reason}")]
    ResponseParse {
        resource: &'static str,
        reason: String,
    },

    #[error("{0}")]
    Command(String),

    #[error("attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SolumError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SolumError::NotFound { .. })
            || matches!(self, SolumError::Api { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, SolumError>;
