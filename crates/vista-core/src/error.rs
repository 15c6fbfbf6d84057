//! Error types for Vista Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing hook: {0} is required when playback reporting is enabled")]
    MissingHook(&'static str),

    // Media errors
    #[error("Invalid media url: {0}")]
    InvalidMediaUrl(String),

    // Engine errors
    #[error("Engine failure: {0}")]
    Engine(#[from] crate::engine::EngineError),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code for logging and report payloads
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::MissingHook(_) => "MISSING_HOOK",
            Error::InvalidMediaUrl(_) => "INVALID_MEDIA_URL",
            Error::Engine(_) => "ENGINE",
            Error::Internal(_) => "INTERNAL",
        }
    }
}
