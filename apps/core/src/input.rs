use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::analysis::Task;
use crate::config::InputLimits;
use crate::error::AppError;

fn all_tasks() -> Vec<Task> {
    Task::ALL.to_vec()
}

/// A caller's analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AnalysisRequest {
    /// The text to analyze.
    #[validate(length(min = 1))]
    pub text: String,
    /// Tasks to run. Defaults to all four when omitted.
    #[serde(default = "all_tasks")]
    #[validate(length(min = 1))]
    pub analyses: Vec<Task>,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            analyses: all_tasks(),
        }
    }

    pub fn with_analyses(mut self, analyses: Vec<Task>) -> Self {
        self.analyses = analyses;
        self
    }

    /// Field validation plus the configured length window on the trimmed text.
    pub fn validate_with(&self, limits: &InputLimits) -> Result<(), AppError> {
        self.validate()?;

        let length = self.text.trim().chars().count();
        if length < limits.min_chars {
            return Err(AppError::Validation(format!(
                "text is too short: {} characters, minimum {}",
                length, limits.min_chars
            )));
        }
        if length > limits.max_chars {
            return Err(AppError::Validation(format!(
                "text is too long: {} characters, maximum {}",
                length, limits.max_chars
            )));
        }
        Ok(())
    }

    pub fn runs_all(&self) -> bool {
        Task::ALL.iter().all(|t| self.analyses.contains(t))
    }
}
