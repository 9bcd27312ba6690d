//! Hugging Face Inference API backend.
//!
//! One hosted model per task. Responses are parsed into [`TaskOutput`]; anything that
//! does not fit the expected shape is reported as [`RemoteError::InvalidPayload`] so
//! the caller can fall back to local scoring.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{LabelScore, RemoteError, RemoteInferenceClient, RemoteKeyword, TaskOutput};
use crate::analysis::Task;
use crate::config::{ModelIds, RemoteConfig};

/// Summarization models reject very short inputs
const MIN_SUMMARY_WORDS: usize = 50;

/// Candidate labels for zero-shot topic extraction
const TOPIC_LABELS: &[&str] = &[
    "technology",
    "business",
    "health",
    "education",
    "entertainment",
    "sports",
    "politics",
    "science",
];

/// Topics scoring at or below this are dropped
const TOPIC_THRESHOLD: f64 = 0.3;

#[derive(Debug, Deserialize)]
struct SummaryItem {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
struct ZeroShotOutput {
    labels: Vec<String>,
    scores: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct WhoAmI {
    name: Option<String>,
}

/// Client for `api-inference.huggingface.co`
#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    api_key: String,
    base_url: String,
    whoami_url: String,
    models: ModelIds,
}

impl std::fmt::Debug for HuggingFaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceClient")
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .finish_non_exhaustive()
    }
}

impl HuggingFaceClient {
    /// Builds a client from configuration.
    ///
    /// Fails with [`RemoteError::MissingCredentials`] when no API key is set.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(RemoteError::MissingCredentials)?
            .to_string();

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
            whoami_url: config.whoami_url.clone(),
            models: config.models.clone(),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), model)
    }

    fn auth_headers(&self) -> Result<HeaderMap, RemoteError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| RemoteError::Rejected("API key is not a valid header value".to_string()))?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    fn payload(task: Task, text: &str) -> Value {
        match task {
            Task::Sentiment | Task::Emotion => json!({
                "inputs": text,
                "parameters": { "return_all_scores": true }
            }),
            Task::Keywords => json!({ "inputs": text }),
            Task::Summary => json!({
                "inputs": text,
                "parameters": {
                    "max_length": 150,
                    "min_length": 30,
                    "do_sample": false
                }
            }),
        }
    }

    async fn post(&self, task: Task, text: &str) -> Result<Value, RemoteError> {
        let url = self.model_url(self.models.for_task(task));
        debug!("POST {} ({})", url, task);
        self.post_json(&url, &Self::payload(task, text)).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, RemoteError> {
        let response = self
            .client
            .post(url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Zero-shot classification over [`TOPIC_LABELS`], reported as keywords.
    async fn topics(&self, text: &str) -> Result<Vec<RemoteKeyword>, RemoteError> {
        let url = self.model_url(&self.models.topics);
        debug!("POST {} (topics)", url);

        let body = json!({
            "inputs": text,
            "parameters": {
                "candidate_labels": TOPIC_LABELS,
                "multi_label": true
            }
        });
        parse_topics(self.post_json(&url, &body).await?)
    }

    async fn keywords(&self, text: &str) -> Result<Vec<RemoteKeyword>, RemoteError> {
        let primary = self
            .post(Task::Keywords, text)
            .await
            .and_then(parse_keywords);

        match primary {
            Ok(keywords) => Ok(keywords),
            Err(err) => {
                warn!("Keyword model failed ({}), trying zero-shot topics", err);
                // Report the keyword model's error, not the fallback's
                self.topics(text).await.map_err(|topic_err| {
                    debug!("Zero-shot topics failed: {}", topic_err);
                    err
                })
            }
        }
    }
}

/// `{labels, scores}` pairs above [`TOPIC_THRESHOLD`], in the model's order.
fn parse_topics(value: Value) -> Result<Vec<RemoteKeyword>, RemoteError> {
    let output: ZeroShotOutput = serde_json::from_value(value)
        .map_err(|e| RemoteError::InvalidPayload(format!("topics: {}", e)))?;

    let topics: Vec<RemoteKeyword> = output
        .labels
        .into_iter()
        .zip(output.scores)
        .filter(|(_, score)| *score > TOPIC_THRESHOLD)
        .map(|(word, score)| RemoteKeyword { word, score })
        .collect();

    if topics.is_empty() {
        return Err(RemoteError::InvalidPayload(
            "no topic above threshold".to_string(),
        ));
    }
    Ok(topics)
}

/// Accepts both `[[{label, score}]]` and `[{label, score}]`.
fn parse_labels(value: Value) -> Result<Vec<LabelScore>, RemoteError> {
    let inner = match value {
        Value::Array(mut outer) if matches!(outer.first(), Some(Value::Array(_))) => outer.remove(0),
        other => other,
    };

    let labels: Vec<LabelScore> = serde_json::from_value(inner)
        .map_err(|e| RemoteError::InvalidPayload(format!("label scores: {}", e)))?;

    if labels.is_empty() {
        return Err(RemoteError::InvalidPayload("no label scores".to_string()));
    }
    Ok(labels)
}

fn parse_keywords(value: Value) -> Result<Vec<RemoteKeyword>, RemoteError> {
    let keywords: Vec<RemoteKeyword> = serde_json::from_value(value)
        .map_err(|e| RemoteError::InvalidPayload(format!("keywords: {}", e)))?;

    let keywords: Vec<RemoteKeyword> = keywords
        .into_iter()
        .filter(|k| !k.word.trim().is_empty())
        .collect();

    if keywords.is_empty() {
        return Err(RemoteError::InvalidPayload("no keywords".to_string()));
    }
    Ok(keywords)
}

fn parse_summary(value: Value) -> Result<String, RemoteError> {
    let items: Vec<SummaryItem> = serde_json::from_value(value)
        .map_err(|e| RemoteError::InvalidPayload(format!("summary: {}", e)))?;

    items
        .into_iter()
        .map(|item| item.summary_text.trim().to_string())
        .find(|s| !s.is_empty())
        .ok_or_else(|| RemoteError::InvalidPayload("empty summary".to_string()))
}

#[async_trait]
impl RemoteInferenceClient for HuggingFaceClient {
    async fn infer(&self, task: Task, text: &str) -> Result<TaskOutput, RemoteError> {
        if task == Task::Summary && text.split_whitespace().count() < MIN_SUMMARY_WORDS {
            return Err(RemoteError::Rejected(
                "text too short for summarization".to_string(),
            ));
        }

        match task {
            Task::Sentiment | Task::Emotion => {
                parse_labels(self.post(task, text).await?).map(TaskOutput::Labels)
            }
            Task::Keywords => self.keywords(text).await.map(TaskOutput::Keywords),
            Task::Summary => parse_summary(self.post(task, text).await?).map(TaskOutput::Summary),
        }
    }

    async fn check_connection(&self) -> Result<String, RemoteError> {
        let response = self
            .client
            .get(&self.whoami_url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let who: WhoAmI = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidPayload(format!("whoami: {}", e)))?;
        let name = who.name.unwrap_or_else(|| "Unknown".to_string());
        info!("Connected to Hugging Face as {}", name);
        Ok(name)
    }
}
