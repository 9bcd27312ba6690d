use std::io;
use thiserror::Error;

use crate::analysis::Method;
use crate::remote::RemoteError;

/// Application-wide error type for configuration, lexicon loading and request validation.
///
/// The analysis entry points never return it: every analysis call produces a result.
#[derive(Debug, Error)]
pub enum AppError {
    /// Represents configuration-related errors (e.g., an unparseable environment variable).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents data validation errors (e.g., input text outside the accepted length).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents failures of the remote inference collaborator.
    #[error("Remote inference error: {0}")]
    Remote(#[from] RemoteError),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents malformed JSON, e.g. in a lexicon override file.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Validation(format!("URL parse error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}

/// Why the cascade moved past a stage. Recorded in result metadata, never surfaced as
/// a failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Downgrade {
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(#[from] RemoteError),

    #[error("no lexical signal")]
    NoLexicalSignal,

    #[error("{0} stage declined")]
    Declined(Method),

    #[error("empty input")]
    EmptyInput,
}
