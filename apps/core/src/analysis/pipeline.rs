//! The remote → pattern → heuristic cascade, implemented once for every task.
//!
//! A task plugs in through [`Scorer`]: it says how to read a remote payload, which
//! local stages to try (in order) and what an empty input yields. [`Pipeline`] walks
//! the stages until one produces a report and stamps the report with the winning
//! [`Method`] and the reasons earlier stages were skipped.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::preprocess::NormalizedText;
use super::results::{Analysis, Method, Task};
use crate::error::Downgrade;
use crate::remote::{RemoteError, RemoteInferenceClient, TaskOutput};

/// A local cascade stage. Returning `Err` hands over to the next stage.
pub struct Stage<S: Scorer> {
    pub method: Method,
    pub run: fn(&S, &NormalizedText) -> Result<S::Report, Downgrade>,
}

impl<S: Scorer> Stage<S> {
    pub fn new(
        method: Method,
        run: fn(&S, &NormalizedText) -> Result<S::Report, Downgrade>,
    ) -> Self {
        Self { method, run }
    }
}

/// Task-specific scoring plugged into the cascade.
pub trait Scorer: Send + Sync + Sized {
    type Report: Send;

    const TASK: Task;

    /// Result for input with no words.
    fn empty_report(&self, text: &NormalizedText) -> Self::Report;

    /// Maps a remote payload onto this task's report.
    fn from_remote(
        &self,
        text: &NormalizedText,
        output: TaskOutput,
    ) -> Result<Self::Report, RemoteError>;

    /// Local stages in the order they are tried.
    fn local_stages(&self) -> Vec<Stage<Self>>;

    /// Whether the remote stage should be attempted at all for this text.
    fn remote_eligible(&self, _text: &NormalizedText) -> bool {
        true
    }
}

/// Runs only the local stages. Pure: the same input always gives the same report.
pub fn run_local<S: Scorer>(scorer: &S, text: &NormalizedText) -> Analysis<S::Report> {
    let started = Instant::now();
    if text.is_empty() {
        return empty_result(scorer, text, started, Vec::new());
    }
    local_cascade(scorer, text, started, Vec::new())
}

fn empty_result<S: Scorer>(
    scorer: &S,
    text: &NormalizedText,
    started: Instant,
    mut downgrades: Vec<String>,
) -> Analysis<S::Report> {
    debug!(task = %S::TASK, "{}", Downgrade::EmptyInput);
    downgrades.push(Downgrade::EmptyInput.to_string());
    Analysis::stamp(
        scorer.empty_report(text),
        Method::EmptyInput,
        S::TASK,
        text,
        started,
        downgrades,
    )
}

fn local_cascade<S: Scorer>(
    scorer: &S,
    text: &NormalizedText,
    started: Instant,
    mut downgrades: Vec<String>,
) -> Analysis<S::Report> {
    for stage in scorer.local_stages() {
        match (stage.run)(scorer, text) {
            Ok(report) => {
                return Analysis::stamp(report, stage.method, S::TASK, text, started, downgrades)
            }
            Err(reason) => {
                debug!(task = %S::TASK, stage = %stage.method, "Stage declined: {}", reason);
                downgrades.push(reason.to_string());
            }
        }
    }

    // Only reachable when the text has words but no usable terms, e.g. "... !!".
    empty_result(scorer, text, started, downgrades)
}

/// Cascade runner holding the optional remote collaborator.
#[derive(Clone)]
pub struct Pipeline {
    remote: Option<Arc<dyn RemoteInferenceClient>>,
    timeout: Duration,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("remote", &self.remote.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Pipeline {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// A pipeline that never leaves the process.
    pub fn local() -> Self {
        Self {
            remote: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_remote(client: Arc<dyn RemoteInferenceClient>, timeout: Duration) -> Self {
        Self {
            remote: Some(client),
            timeout,
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn remote(&self) -> Option<&Arc<dyn RemoteInferenceClient>> {
        self.remote.as_ref()
    }

    /// Runs the full cascade. Never fails: a remote problem only downgrades the method.
    pub async fn run<S: Scorer>(&self, scorer: &S, text: &NormalizedText) -> Analysis<S::Report> {
        let started = Instant::now();
        if text.is_empty() {
            return empty_result(scorer, text, started, Vec::new());
        }

        let mut downgrades = Vec::new();
        match self.attempt_remote(scorer, text).await {
            Ok(report) => {
                return Analysis::stamp(report, Method::Remote, S::TASK, text, started, downgrades)
            }
            Err(reason) => downgrades.push(reason.to_string()),
        }

        local_cascade(scorer, text, started, downgrades)
    }

    /// One-shot remote attempt bounded by the configured timeout. No retries.
    async fn attempt_remote<S: Scorer>(
        &self,
        scorer: &S,
        text: &NormalizedText,
    ) -> Result<S::Report, Downgrade> {
        let Some(client) = &self.remote else {
            debug!(task = %S::TASK, "No remote client configured, scoring locally");
            return Err(RemoteError::MissingCredentials.into());
        };

        if !scorer.remote_eligible(text) {
            debug!(task = %S::TASK, "Remote stage skipped for this input");
            return Err(Downgrade::Declined(Method::Remote));
        }

        let output = match timeout(self.timeout, client.infer(S::TASK, text.raw.trim())).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(task = %S::TASK, "Remote inference failed: {}", e);
                return Err(e.into());
            }
            Err(_) => {
                warn!(task = %S::TASK, "Remote inference timed out after {:?}", self.timeout);
                return Err(RemoteError::Timeout(self.timeout).into());
            }
        };

        match scorer.from_remote(text, output) {
            Ok(report) => {
                info!(task = %S::TASK, "Remote inference succeeded");
                Ok(report)
            }
            Err(e) => {
                warn!(task = %S::TASK, "Remote payload unusable: {}", e);
                Err(e.into())
            }
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::local()
    }
}
