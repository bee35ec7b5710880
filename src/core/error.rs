use thiserror::Error;

/// Errors surfaced by the token pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// No document-title keyword was found in the token sequence.
    #[error("unrecognized document: no title keyword matched")]
    UnrecognizedDocument,

    /// The OCR payload or a token stream is malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The label keyword spec or pipeline config is missing a required entry.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config file: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
