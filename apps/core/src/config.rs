//! Application configuration.
//!
//! Values come from environment variables, optionally seeded from a `.env` file.
//! Everything has a default except the Hugging Face API key; without it the
//! analyzers run fully offline.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::analysis::Task;
use crate::error::AppError;
use crate::telemetry::LogFormat;

pub const DEFAULT_API_URL: &str = "https://api-inference.huggingface.co/models/";
pub const DEFAULT_WHOAMI_URL: &str = "https://huggingface.co/api/whoami";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 10;
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 10_000;

/// Hosted model used for each task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelIds {
    pub sentiment: String,
    pub keywords: String,
    pub emotion: String,
    pub summary: String,
    /// Zero-shot classifier used when the keyword model fails
    pub topics: String,
}

impl Default for ModelIds {
    fn default() -> Self {
        Self {
            sentiment: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            keywords: "yanekyuk/bert-keyword-extractor".to_string(),
            emotion: "j-hartmann/emotion-english-distilroberta-base".to_string(),
            summary: "facebook/bart-large-cnn".to_string(),
            topics: "facebook/bart-large-mnli".to_string(),
        }
    }
}

impl ModelIds {
    pub fn for_task(&self, task: Task) -> &str {
        match task {
            Task::Sentiment => &self.sentiment,
            Task::Keywords => &self.keywords,
            Task::Emotion => &self.emotion,
            Task::Summary => &self.summary,
        }
    }
}

/// Remote inference settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub whoami_url: String,
    pub timeout_secs: u64,
    pub models: ModelIds,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_API_URL.to_string(),
            whoami_url: DEFAULT_WHOAMI_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            models: ModelIds::default(),
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Accepted input size, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLimits {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_TEXT_LENGTH,
            max_chars: DEFAULT_MAX_TEXT_LENGTH,
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub limits: InputLimits,
    /// Optional JSON file replacing built-in lexicon tables
    pub lexicon_path: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the environment.
    pub fn load() -> Result<Self, AppError> {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    /// Reads configuration from the process environment only.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = RemoteConfig::default();

        let remote = RemoteConfig {
            api_key: optional_var("HUGGINGFACE_API_KEY"),
            base_url: optional_var("HUGGINGFACE_API_URL").unwrap_or(defaults.base_url),
            whoami_url: optional_var("HUGGINGFACE_WHOAMI_URL").unwrap_or(defaults.whoami_url),
            timeout_secs: parsed_var("HUGGINGFACE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            models: defaults.models,
        };

        let limits = InputLimits {
            min_chars: parsed_var("TEXTLENS_MIN_TEXT_LENGTH", DEFAULT_MIN_TEXT_LENGTH)?,
            max_chars: parsed_var("TEXTLENS_MAX_TEXT_LENGTH", DEFAULT_MAX_TEXT_LENGTH)?,
        };

        let log_format = match optional_var("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        let config = Self {
            remote,
            limits,
            lexicon_path: optional_var("TEXTLENS_LEXICON_PATH").map(PathBuf::from),
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks URLs and limits for consistency.
    pub fn validate(&self) -> Result<(), AppError> {
        Url::parse(&self.remote.base_url)?;
        Url::parse(&self.remote.whoami_url)?;

        if self.remote.timeout_secs == 0 {
            return Err(AppError::Config(
                "HUGGINGFACE_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        if self.limits.min_chars > self.limits.max_chars {
            return Err(AppError::Config(format!(
                "minimum text length {} exceeds maximum {}",
                self.limits.min_chars, self.limits.max_chars
            )));
        }

        Ok(())
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match optional_var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 8] = [
        "HUGGINGFACE_API_KEY",
        "HUGGINGFACE_API_URL",
        "HUGGINGFACE_WHOAMI_URL",
        "HUGGINGFACE_TIMEOUT_SECS",
        "TEXTLENS_MIN_TEXT_LENGTH",
        "TEXTLENS_MAX_TEXT_LENGTH",
        "TEXTLENS_LEXICON_PATH",
        "LOG_FORMAT",
    ];

    fn env_with(overrides: &[(&'static str, &'static str)]) -> Vec<(&'static str, Option<&'static str>)> {
        VARS.iter()
            .map(|key| {
                let value = overrides.iter().find(|(k, _)| k == key).map(|(_, v)| *v);
                (*key, value)
            })
            .collect()
    }

    #[test]
    fn test_defaults_without_environment() {
        temp_env::with_vars(env_with(&[]), || {
            let config = AppConfig::from_env().expect("defaults should load");
            assert_eq!(config, AppConfig::default());
            assert!(!config.remote.has_credentials());
            assert_eq!(config.remote.timeout(), Duration::from_secs(30));
            assert_eq!(config.limits.max_chars, 10_000);
        });
    }

    #[test]
    fn test_reads_overrides() {
        let vars = env_with(&[
            ("HUGGINGFACE_API_KEY", "hf_abc"),
            ("HUGGINGFACE_TIMEOUT_SECS", "5"),
            ("TEXTLENS_MIN_TEXT_LENGTH", "1"),
            ("TEXTLENS_LEXICON_PATH", "/etc/textlens/lexicon.json"),
            ("LOG_FORMAT", "json"),
        ]);

        temp_env::with_vars(vars, || {
            let config = AppConfig::from_env().expect("overrides should load");
            assert!(config.remote.has_credentials());
            assert_eq!(config.remote.timeout_secs, 5);
            assert_eq!(config.limits.min_chars, 1);
            assert_eq!(
                config.lexicon_path,
                Some(PathBuf::from("/etc/textlens/lexicon.json"))
            );
            assert_eq!(config.log_format, LogFormat::Json);
        });
    }

    #[test]
    fn test_invalid_number() {
        let vars = env_with(&[("HUGGINGFACE_TIMEOUT_SECS", "soon")]);

        temp_env::with_vars(vars, || {
            assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));
        });
    }

    #[test]
    fn test_invalid_url() {
        let config = AppConfig {
            remote: RemoteConfig {
                base_url: "not a url".to_string(),
                ..RemoteConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_inverted_limits() {
        let config = AppConfig {
            limits: InputLimits {
                min_chars: 500,
                max_chars: 10,
            },
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_model_ids_per_task() {
        let models = ModelIds::default();
        assert_eq!(models.for_task(Task::Summary), "facebook/bart-large-cnn");
        assert_eq!(
            models.for_task(Task::Emotion),
            "j-hartmann/emotion-english-distilroberta-base"
        );
    }
}
