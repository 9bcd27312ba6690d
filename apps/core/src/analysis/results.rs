//! Result types shared by every analysis task.
//!
//! Each task produces a report wrapped in an [`Analysis`], which records the cascade
//! stage that produced it (`method`) and per-request metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use uuid::Uuid;

use super::emotion::EmotionReport;
use super::keywords::KeywordReport;
use super::sentiment::SentimentReport;
use super::statistics::{QualityScore, TextStatistics};
use super::summary::SummaryReport;
use crate::error::AppError;

/// Analysis task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Sentiment,
    Keywords,
    Emotion,
    #[serde(alias = "summarize", alias = "summarization")]
    Summary,
}

impl Task {
    pub const ALL: [Task; 4] = [Task::Sentiment, Task::Keywords, Task::Emotion, Task::Summary];

    pub fn label(&self) -> &'static str {
        match self {
            Task::Sentiment => "sentiment",
            Task::Keywords => "keywords",
            Task::Emotion => "emotion",
            Task::Summary => "summary",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Task {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentiment" => Ok(Task::Sentiment),
            "keywords" => Ok(Task::Keywords),
            "emotion" => Ok(Task::Emotion),
            "summary" | "summarize" | "summarization" => Ok(Task::Summary),
            other => Err(AppError::Validation(format!("unknown analysis: {}", other))),
        }
    }
}

/// Cascade stage that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Remote inference service answered
    Remote,
    /// Lexicon or filtered-candidate scoring
    PatternMatching,
    /// Structural/punctuation signals only
    Heuristic,
    /// Input had no words
    EmptyInput,
    /// Input returned unchanged
    Verbatim,
}

impl Method {
    pub fn label(&self) -> &'static str {
        match self {
            Method::Remote => "remote",
            Method::PatternMatching => "pattern_matching",
            Method::Heuristic => "heuristic",
            Method::EmptyInput => "empty_input",
            Method::Verbatim => "verbatim",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Category scores, iterated in the category's declaration order.
///
/// Category enums declare their variants in tie-break priority order, so the first
/// maximum found while iterating is the winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreMap<K: Ord>(BTreeMap<K, f64>);

impl<K: Ord + Copy> ScoreMap<K> {
    /// Scales non-negative raw scores into a distribution summing to 100.
    ///
    /// Values are rounded to two decimals and the rounding residual is folded back in
    /// so the sum stays exact. The raw winner keeps the lead: a positive residual goes
    /// to it, a negative one is taken from the strongest other category. Returns `None`
    /// when nothing scored.
    pub fn normalize<I>(raw: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
    {
        let raw = ScoreMap(raw.into_iter().map(|(k, v)| (k, v.max(0.0))).collect());
        let total = raw.total();
        if total <= 0.0 {
            return None;
        }
        let (winner, _) = raw.leader()?;

        let mut scores: BTreeMap<K, f64> = raw
            .0
            .into_iter()
            .map(|(k, v)| (k, round2(v / total * 100.0)))
            .collect();

        let residual = round2(100.0 - scores.values().sum::<f64>());
        let target = if residual < 0.0 {
            // latest in order among the strongest runners-up, so earlier ties keep their rank
            scores
                .iter()
                .filter(|&(&k, &v)| k != winner && v >= -residual)
                .fold(None, |best: Option<(K, f64)>, (&k, &v)| match best {
                    Some((_, top)) if v < top => best,
                    _ => Some((k, v)),
                })
                .map_or(winner, |(k, _)| k)
        } else {
            winner
        };

        if residual != 0.0 {
            if let Some(value) = scores.get_mut(&target) {
                *value = round2(*value + residual);
            }
        }

        Some(ScoreMap(scores))
    }

    /// A distribution putting everything on one category.
    pub fn certain(winner: K, categories: &[K]) -> Self {
        ScoreMap(
            categories
                .iter()
                .map(|&k| (k, if k == winner { 100.0 } else { 0.0 }))
                .collect(),
        )
    }

    /// Adds zero entries for categories missing from the map.
    pub fn with_categories(mut self, categories: &[K]) -> Self {
        for &k in categories {
            self.0.entry(k).or_insert(0.0);
        }
        self
    }

    /// Highest-scoring category; ties go to the earliest in declaration order.
    pub fn leader(&self) -> Option<(K, f64)> {
        let mut best: Option<(K, f64)> = None;
        for (&k, &v) in &self.0 {
            match best {
                Some((_, top)) if v <= top => {}
                _ => best = Some((k, v)),
            }
        }
        best
    }

    pub fn get(&self, key: K) -> f64 {
        self.0.get(&key).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, f64)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-request bookkeeping attached to every result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub analysis_id: Uuid,
    pub task: Task,
    pub processing_time_ms: f64,
    /// Length of the cleaned text in characters
    pub text_length: usize,
    pub word_count: usize,
    /// Why earlier cascade stages were skipped, in order
    pub downgrades: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// A task report tagged with its provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis<R> {
    #[serde(flatten)]
    pub report: R,
    pub method: Method,
    pub metadata: AnalysisMetadata,
}

impl<R> Analysis<R> {
    pub(crate) fn stamp(
        report: R,
        method: Method,
        task: Task,
        text: &super::preprocess::NormalizedText,
        started: Instant,
        downgrades: Vec<String>,
    ) -> Self {
        Self {
            report,
            method,
            metadata: AnalysisMetadata {
                analysis_id: Uuid::new_v4(),
                task,
                processing_time_ms: round2(started.elapsed().as_secs_f64() * 1000.0),
                text_length: text.clean.chars().count(),
                word_count: text.word_count(),
                downgrades,
                timestamp: Utc::now(),
            },
        }
    }
}

pub type SentimentResult = Analysis<SentimentReport>;
pub type KeywordResult = Analysis<KeywordReport>;
pub type EmotionResult = Analysis<EmotionReport>;
pub type SummaryResult = Analysis<SummaryReport>;

/// Output of `analyze_all`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedResult {
    pub analysis_id: Uuid,
    pub sentiment: SentimentResult,
    pub keywords: KeywordResult,
    pub emotion: EmotionResult,
    pub summary: SummaryResult,
    pub statistics: TextStatistics,
    pub quality: QualityScore,
    pub processing_time_ms: f64,
    pub timestamp: DateTime<Utc>,
}

impl CombinedResult {
    /// One-line digest for logging
    pub fn summary_line(&self) -> String {
        format!(
            "Sentiment: {} ({:.0}%), Emotion: {}, Keywords: {}, Quality: {} ({})",
            self.sentiment.report.label,
            self.sentiment.report.confidence,
            self.emotion.report.primary,
            self.keywords.report.keywords.len(),
            self.quality.score,
            self.quality.rating.label(),
        )
    }
}

/// Output of `analyze_selected`; only requested tasks are present
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectedResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<KeywordResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryResult>,
}
