//! Orchestrator Cascade Tests
//!
//! Drives the remote → pattern → heuristic cascade with scripted backends and a
//! mocked Hugging Face endpoint.

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::analysis::{AnalysisOrchestrator, Emotion, LexiconStore, Method, SentimentLabel, Task};
use crate::config::{AppConfig, ModelIds, RemoteConfig};
use crate::remote::{LabelScore, RemoteError, RemoteInferenceClient, RemoteKeyword, TaskOutput};

/// Four sentences, so the summarizer is eligible for the remote stage
const LONG_TEXT: &str = "I love this! It is amazing!! Truly great. Best purchase ever.";

#[derive(Clone, Copy)]
enum Behaviour {
    Answer,
    Fail,
    Hang,
}

struct ScriptedRemote {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl ScriptedRemote {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn scripted_output(task: Task) -> TaskOutput {
    match task {
        Task::Sentiment => TaskOutput::Labels(vec![
            LabelScore {
                label: "NEGATIVE".to_string(),
                score: 0.8,
            },
            LabelScore {
                label: "POSITIVE".to_string(),
                score: 0.2,
            },
        ]),
        Task::Emotion => TaskOutput::Labels(vec![
            LabelScore {
                label: "fear".to_string(),
                score: 0.6,
            },
            LabelScore {
                label: "joy".to_string(),
                score: 0.4,
            },
        ]),
        Task::Keywords => TaskOutput::Keywords(vec![RemoteKeyword {
            word: "purchase".to_string(),
            score: 0.9,
        }]),
        Task::Summary => TaskOutput::Summary("Remote summary.".to_string()),
    }
}

#[async_trait]
impl RemoteInferenceClient for ScriptedRemote {
    async fn infer(&self, task: Task, _text: &str) -> Result<TaskOutput, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Answer => Ok(scripted_output(task)),
            Behaviour::Fail => Err(RemoteError::Status {
                status: 503,
                body: "model loading".to_string(),
            }),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(scripted_output(task))
            }
        }
    }

    async fn check_connection(&self) -> Result<String, RemoteError> {
        Ok("scripted".to_string())
    }
}

fn orchestrator_with(remote: Arc<ScriptedRemote>, timeout: Duration) -> AnalysisOrchestrator {
    AnalysisOrchestrator::new(Arc::new(LexiconStore::builtin())).with_remote(remote, timeout)
}

#[cfg(test)]
mod remote_success_tests {
    use super::*;

    #[tokio::test]
    async fn test_remote_answers_every_task() {
        // 1. Arrange
        let remote = ScriptedRemote::new(Behaviour::Answer);
        let orchestrator = orchestrator_with(remote.clone(), Duration::from_secs(1));

        // 2. Act
        let combined = orchestrator.analyze_all(LONG_TEXT).await;

        // 3. Assert
        assert_eq!(remote.calls(), 4);
        assert_eq!(combined.sentiment.method, Method::Remote);
        assert_eq!(combined.sentiment.report.label, SentimentLabel::Negative);
        assert_eq!(combined.sentiment.report.confidence, 80.0);
        assert_eq!(combined.emotion.method, Method::Remote);
        assert_eq!(combined.emotion.report.primary, Emotion::Fear);
        assert_eq!(combined.emotion.report.all_scores.len(), 7);
        assert_eq!(combined.keywords.method, Method::Remote);
        assert_eq!(combined.keywords.report.keywords[0].word, "Purchase");
        assert_eq!(combined.keywords.report.keywords[0].frequency, 1);
        assert_eq!(combined.summary.method, Method::Remote);
        assert_eq!(combined.summary.report.summary, "Remote summary.");
        assert!(combined.sentiment.metadata.downgrades.is_empty());

        // Negative sentiment lowers the quality score
        assert_eq!(combined.quality.score, 45);
    }

    #[tokio::test]
    async fn test_check_connection_uses_remote() {
        let orchestrator = orchestrator_with(ScriptedRemote::new(Behaviour::Answer), Duration::from_secs(1));
        assert!(orchestrator.has_remote());
        assert_eq!(orchestrator.check_connection().await.unwrap(), "scripted");
    }
}

#[cfg(test)]
mod downgrade_tests {
    use super::*;

    #[tokio::test]
    async fn test_failure_falls_back_once_per_task() {
        // 1. Arrange
        let remote = ScriptedRemote::new(Behaviour::Fail);
        let orchestrator = orchestrator_with(remote.clone(), Duration::from_secs(1));

        // 2. Act
        let combined = orchestrator.analyze_all(LONG_TEXT).await;

        // 3. Assert: no retries, one call per task
        assert_eq!(remote.calls(), 4);
        assert_eq!(combined.sentiment.method, Method::PatternMatching);
        assert_eq!(combined.sentiment.report.label, SentimentLabel::Positive);
        assert_eq!(combined.emotion.method, Method::PatternMatching);
        assert_eq!(combined.keywords.method, Method::PatternMatching);
        assert_eq!(combined.summary.method, Method::Heuristic);
        assert!(combined.sentiment.metadata.downgrades[0]
            .starts_with("remote unavailable: remote returned status 503"));
    }

    #[tokio::test]
    async fn test_timeout_bounds_the_remote_attempt() {
        // 1. Arrange
        let remote = ScriptedRemote::new(Behaviour::Hang);
        let orchestrator = orchestrator_with(remote.clone(), Duration::from_millis(50));

        // 2. Act
        let started = Instant::now();
        let result = orchestrator.analyze_sentiment("ok fine whatever").await;

        // 3. Assert
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(result.method, Method::Heuristic);
        assert_eq!(result.report.label, SentimentLabel::Neutral);
        assert_eq!(result.metadata.downgrades.len(), 2);
        assert!(result.metadata.downgrades[0].contains("timed out"));
        assert_eq!(result.metadata.downgrades[1], "no lexical signal");
    }

    #[tokio::test]
    async fn test_empty_input_skips_remote() {
        let remote = ScriptedRemote::new(Behaviour::Answer);
        let orchestrator = orchestrator_with(remote.clone(), Duration::from_secs(1));

        let combined = orchestrator.analyze_all("   ").await;

        assert_eq!(remote.calls(), 0);
        assert_eq!(combined.sentiment.method, Method::EmptyInput);
        assert_eq!(combined.summary.method, Method::EmptyInput);
    }

    #[tokio::test]
    async fn test_short_text_summary_stays_verbatim() {
        let remote = ScriptedRemote::new(Behaviour::Answer);
        let orchestrator = orchestrator_with(remote.clone(), Duration::from_secs(1));

        let text = "Just two sentences. Nothing more.";
        let summary = orchestrator.summarize_text(text).await;

        assert_eq!(remote.calls(), 0);
        assert_eq!(summary.method, Method::Verbatim);
        assert_eq!(summary.report.summary, text);
        assert_eq!(summary.metadata.downgrades, vec!["remote stage declined"]);
    }

    #[tokio::test]
    async fn test_selected_tasks_only_call_remote_for_those() {
        let remote = ScriptedRemote::new(Behaviour::Answer);
        let orchestrator = orchestrator_with(remote.clone(), Duration::from_secs(1));

        let results = orchestrator
            .analyze_selected(LONG_TEXT, &[Task::Emotion])
            .await;

        assert_eq!(remote.calls(), 1);
        assert_eq!(results.emotion.map(|e| e.method), Some(Method::Remote));
        assert!(results.sentiment.is_none());
    }
}

#[cfg(test)]
mod huggingface_cascade_tests {
    use super::*;

    fn config_for(server_url: &str) -> AppConfig {
        AppConfig {
            remote: RemoteConfig {
                api_key: Some("hf_test".to_string()),
                base_url: format!("{}/models/", server_url),
                whoami_url: format!("{}/api/whoami", server_url),
                timeout_secs: 5,
                models: ModelIds::default(),
            },
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_mixed_remote_outcomes() {
        // 1. Arrange
        let mock_server = MockServer::start().await;
        let models = ModelIds::default();

        Mock::given(method("POST"))
            .and(path(format!("/models/{}", models.sentiment)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
                { "label": "POSITIVE", "score": 0.75 },
                { "label": "NEGATIVE", "score": 0.25 }
            ]])))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("/models/{}", models.keywords)))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&mock_server)
            .await;

        let orchestrator = AnalysisOrchestrator::from_config(&config_for(&mock_server.uri())).unwrap();

        // 2. Act
        let sentiment = orchestrator.analyze_sentiment(LONG_TEXT).await;
        let keywords = orchestrator.extract_keywords(LONG_TEXT).await;

        // 3. Assert
        assert_eq!(sentiment.method, Method::Remote);
        assert_eq!(sentiment.report.confidence, 75.0);
        assert_eq!(sentiment.report.score, 5.0);

        assert_eq!(keywords.method, Method::PatternMatching);
        assert!(keywords.metadata.downgrades[0].contains("500"));
    }

    #[tokio::test]
    async fn test_summary_rejected_locally_for_short_input() {
        // Four sentences but fewer than 50 words: the client refuses before any request
        let mock_server = MockServer::start().await;
        let orchestrator = AnalysisOrchestrator::from_config(&config_for(&mock_server.uri())).unwrap();

        let summary = orchestrator.summarize_text(LONG_TEXT).await;

        assert_eq!(summary.method, Method::Heuristic);
        assert!(summary.metadata.downgrades[0].contains("too short"));
        assert!(mock_server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_keywords_from_zero_shot_topics() {
        // 1. Arrange
        let mock_server = MockServer::start().await;
        let models = ModelIds::default();

        Mock::given(method("POST"))
            .and(path(format!("/models/{}", models.keywords)))
            .respond_with(ResponseTemplate::new(503).set_body_string("Model is loading"))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("/models/{}", models.topics)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "labels": ["business", "technology"],
                "scores": [0.64, 0.12]
            })))
            .mount(&mock_server)
            .await;

        let orchestrator =
            AnalysisOrchestrator::from_config(&config_for(&mock_server.uri())).unwrap();

        // 2. Act
        let keywords = orchestrator.extract_keywords(LONG_TEXT).await;

        // 3. Assert
        assert_eq!(keywords.method, Method::Remote);
        assert_eq!(keywords.report.keywords.len(), 1);
        assert_eq!(keywords.report.keywords[0].word, "Business");
        assert_eq!(keywords.report.keywords[0].score, 64.0);
        assert_eq!(keywords.report.keywords[0].frequency, 0);
    }

    #[tokio::test]
    async fn test_without_key_runs_offline() {
        let config = AppConfig::default();
        let orchestrator = AnalysisOrchestrator::from_config(&config).unwrap();
        assert!(!orchestrator.has_remote());
    }
}
