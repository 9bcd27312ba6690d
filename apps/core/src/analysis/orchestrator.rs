//! Analysis orchestrator - entry point for every analysis task.
//!
//! Normalizes the text once, then runs each task through the shared
//! [`Pipeline`]. `analyze_all` runs the four tasks concurrently and adds text
//! statistics and a quality score.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use uuid::Uuid;

use super::emotion::EmotionAnalyzer;
use super::keywords::KeywordExtractor;
use super::lexicon::LexiconStore;
use super::pipeline::Pipeline;
use super::preprocess::Preprocessor;
use super::results::{
    round2, CombinedResult, EmotionResult, KeywordResult, SelectedResults, SentimentResult,
    SummaryResult, Task,
};
use super::sentiment::SentimentAnalyzer;
use super::statistics::{QualityScore, TextStatistics};
use super::summary::Summarizer;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::remote::{HuggingFaceClient, RemoteError, RemoteInferenceClient};

/// Runs the four analysis tasks over shared, read-only lexicons
#[derive(Debug, Clone)]
pub struct AnalysisOrchestrator {
    preprocessor: Preprocessor,
    lexicons: Arc<LexiconStore>,
    sentiment: SentimentAnalyzer,
    emotion: EmotionAnalyzer,
    keywords: KeywordExtractor,
    summarizer: Summarizer,
    pipeline: Pipeline,
}

impl Default for AnalysisOrchestrator {
    fn default() -> Self {
        Self::new(Arc::new(LexiconStore::builtin()))
    }
}

impl AnalysisOrchestrator {
    /// Offline orchestrator: every task is scored locally.
    pub fn new(lexicons: Arc<LexiconStore>) -> Self {
        Self {
            preprocessor: Preprocessor::new(),
            sentiment: SentimentAnalyzer::new(Arc::clone(&lexicons)),
            emotion: EmotionAnalyzer::new(Arc::clone(&lexicons)),
            keywords: KeywordExtractor::new(Arc::clone(&lexicons)),
            summarizer: Summarizer::new(),
            lexicons,
            pipeline: Pipeline::local(),
        }
    }

    /// Attempts `client` first for every task, bounded by `timeout`.
    pub fn with_remote(
        mut self,
        client: Arc<dyn RemoteInferenceClient>,
        timeout: Duration,
    ) -> Self {
        self.pipeline = Pipeline::with_remote(client, timeout);
        self
    }

    /// Builds lexicons and the optional Hugging Face client from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let lexicons = match &config.lexicon_path {
            Some(path) => LexiconStore::from_json_file(path)?,
            None => LexiconStore::builtin(),
        };
        let orchestrator = Self::new(Arc::new(lexicons));

        if !config.remote.has_credentials() {
            info!("No Hugging Face API key configured, running offline");
            return Ok(orchestrator);
        }

        let client = HuggingFaceClient::from_config(&config.remote)?;
        info!(
            "Remote inference enabled (timeout {:?})",
            config.remote.timeout()
        );
        Ok(orchestrator.with_remote(Arc::new(client), config.remote.timeout()))
    }

    pub fn lexicons(&self) -> &Arc<LexiconStore> {
        &self.lexicons
    }

    pub fn has_remote(&self) -> bool {
        self.pipeline.has_remote()
    }

    pub async fn analyze_sentiment(&self, text: &str) -> SentimentResult {
        let normalized = self.preprocessor.normalize(text);
        self.pipeline.run(&self.sentiment, &normalized).await
    }

    pub async fn extract_keywords(&self, text: &str) -> KeywordResult {
        let normalized = self.preprocessor.normalize(text);
        self.pipeline.run(&self.keywords, &normalized).await
    }

    pub async fn detect_emotion(&self, text: &str) -> EmotionResult {
        let normalized = self.preprocessor.normalize(text);
        self.pipeline.run(&self.emotion, &normalized).await
    }

    pub async fn summarize_text(&self, text: &str) -> SummaryResult {
        let normalized = self.preprocessor.normalize(text);
        self.pipeline.run(&self.summarizer, &normalized).await
    }

    /// All four tasks plus statistics and the overall quality score.
    pub async fn analyze_all(&self, text: &str) -> CombinedResult {
        let start = Instant::now();
        let normalized = self.preprocessor.normalize(text);

        let (sentiment, keywords, emotion, summary) = tokio::join!(
            self.pipeline.run(&self.sentiment, &normalized),
            self.pipeline.run(&self.keywords, &normalized),
            self.pipeline.run(&self.emotion, &normalized),
            self.pipeline.run(&self.summarizer, &normalized),
        );

        let statistics = TextStatistics::compute(&normalized);
        let quality = QualityScore::evaluate(sentiment.report.label, statistics.lexical_diversity);

        let combined = CombinedResult {
            analysis_id: Uuid::new_v4(),
            sentiment,
            keywords,
            emotion,
            summary,
            statistics,
            quality,
            processing_time_ms: round2(start.elapsed().as_secs_f64() * 1000.0),
            timestamp: Utc::now(),
        };

        info!("Analysis complete: {}", combined.summary_line());
        combined
    }

    /// Runs only the requested tasks, each at most once.
    pub async fn analyze_selected(&self, text: &str, tasks: &[Task]) -> SelectedResults {
        let normalized = self.preprocessor.normalize(text);
        let requested: HashSet<Task> = tasks.iter().copied().collect();
        let mut results = SelectedResults::default();

        for task in Task::ALL.into_iter().filter(|t| requested.contains(t)) {
            match task {
                Task::Sentiment => {
                    results.sentiment = Some(self.pipeline.run(&self.sentiment, &normalized).await)
                }
                Task::Keywords => {
                    results.keywords = Some(self.pipeline.run(&self.keywords, &normalized).await)
                }
                Task::Emotion => {
                    results.emotion = Some(self.pipeline.run(&self.emotion, &normalized).await)
                }
                Task::Summary => {
                    results.summary = Some(self.pipeline.run(&self.summarizer, &normalized).await)
                }
            }
        }

        results
    }

    /// Verifies the remote backend, returning the account name.
    pub async fn check_connection(&self) -> Result<String, RemoteError> {
        match self.pipeline.remote() {
            Some(client) => client.check_connection().await,
            None => Err(RemoteError::MissingCredentials),
        }
    }
}
