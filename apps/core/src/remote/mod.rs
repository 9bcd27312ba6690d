//! Remote inference collaborator.
//!
//! The analysis core only needs success/failure and a parsed payload from the remote
//! service. Transport, authentication and model selection live behind
//! [`RemoteInferenceClient`], so a different backend can be swapped in without touching
//! the scorers.

pub mod huggingface;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::analysis::Task;

pub use huggingface::HuggingFaceClient;

/// Failures of the remote collaborator. Always recoverable: the cascade falls back
/// to local scoring.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RemoteError {
    #[error("remote credentials are not configured")]
    MissingCredentials,

    #[error("remote inference timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("remote returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("task {0} is not supported by this backend")]
    Unsupported(Task),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Http(format!("request timed out: {}", err))
        } else {
            RemoteError::Http(err.to_string())
        }
    }
}

/// A label with a probability in `0.0..=1.0`, as classification models report it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// A keyword proposed by the remote model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteKeyword {
    pub word: String,
    pub score: f64,
}

/// Parsed payload of a successful remote call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum TaskOutput {
    Labels(Vec<LabelScore>),
    Keywords(Vec<RemoteKeyword>),
    Summary(String),
}

/// Remote inference backend.
#[async_trait]
pub trait RemoteInferenceClient: Send + Sync + 'static {
    /// Runs `task` over `text` and returns the parsed model output.
    async fn infer(&self, task: Task, text: &str) -> Result<TaskOutput, RemoteError>;

    /// Verifies credentials and reachability, returning the account name.
    async fn check_connection(&self) -> Result<String, RemoteError>;
}
