//! Sentiment classification.
//!
//! Lexicon hits decide the label when there are any; otherwise punctuation and
//! casing signals are weighed against a neutral baseline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::lexicon::LexiconStore;
use super::pipeline::{run_local, Scorer, Stage};
use super::preprocess::{NormalizedText, Preprocessor};
use super::results::{round2, Method, ScoreMap, SentimentResult, Task};
use crate::error::Downgrade;
use crate::remote::{RemoteError, TaskOutput};

/// Sentiment polarity. Declaration order is the tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    #[serde(alias = "positive")]
    Positive,
    #[serde(alias = "negative")]
    Negative,
    #[serde(alias = "neutral")]
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
        }
    }

    /// Case-insensitive match against a model label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub label: SentimentLabel,
    /// 0..=100
    pub confidence: f64,
    /// -100..=100, positive leaning above zero
    pub score: f64,
    /// Distribution over the three labels, summing to 100
    pub scores: ScoreMap<SentimentLabel>,
}

impl SentimentReport {
    fn from_distribution(scores: ScoreMap<SentimentLabel>) -> Self {
        let (label, confidence) = scores.leader().unwrap_or((SentimentLabel::Neutral, 0.0));
        Self {
            label,
            confidence,
            score: polarity(&scores),
            scores,
        }
    }
}

/// (positive% − negative%) / 10, clamped to ±100.
fn polarity(scores: &ScoreMap<SentimentLabel>) -> f64 {
    let diff = scores.get(SentimentLabel::Positive) - scores.get(SentimentLabel::Negative);
    round2(diff / 10.0).clamp(-100.0, 100.0)
}

// Heuristic weights
const EXCLAMATION_WEIGHT: f64 = 0.5;
const QUESTION_WEIGHT: f64 = 0.3;
const CAPS_WEIGHT: f64 = 0.3;
const ELLIPSIS_WEIGHT: f64 = 0.2;
const NEUTRAL_BASELINE: f64 = 50.0;
const LONG_TEXT_WORDS: usize = 50;
const LONG_TEXT_BONUS: f64 = 10.0;

/// Sentiment scorer over a shared lexicon
#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicons: Arc<LexiconStore>,
}

impl SentimentAnalyzer {
    pub fn new(lexicons: Arc<LexiconStore>) -> Self {
        Self { lexicons }
    }

    /// Local-only analysis of raw text.
    pub fn analyze(&self, text: &str) -> SentimentResult {
        run_local(self, &Preprocessor::new().normalize(text))
    }

    fn pattern_stage(&self, text: &NormalizedText) -> Result<SentimentReport, Downgrade> {
        let counts = self.lexicons.sentiment.count_matches(&text.clean);
        let scores = ScoreMap::normalize(counts.into_iter().map(|(label, n)| (label, n as f64)))
            .ok_or(Downgrade::NoLexicalSignal)?
            .with_categories(&SentimentLabel::ALL);

        Ok(SentimentReport::from_distribution(scores))
    }

    fn heuristic_stage(&self, text: &NormalizedText) -> Result<SentimentReport, Downgrade> {
        let signals = &text.signals;

        let positive = EXCLAMATION_WEIGHT * signals.exclamations as f64
            + QUESTION_WEIGHT * signals.questions as f64;
        let negative =
            CAPS_WEIGHT * signals.caps_tokens as f64 + ELLIPSIS_WEIGHT * signals.ellipses as f64;
        let mut neutral = NEUTRAL_BASELINE;
        if text.word_count() > LONG_TEXT_WORDS {
            neutral += LONG_TEXT_BONUS;
        }

        let raw = [
            (SentimentLabel::Positive, positive),
            (SentimentLabel::Negative, negative),
            (SentimentLabel::Neutral, neutral),
        ];
        let scores = ScoreMap::normalize(raw).ok_or(Downgrade::NoLexicalSignal)?;
        let mut report = SentimentReport::from_distribution(scores);

        // Confidence reflects the winner's raw weight, not its share
        let winner_raw = raw
            .iter()
            .find(|(label, _)| *label == report.label)
            .map_or(0.0, |(_, v)| *v);
        report.confidence = round2(winner_raw.clamp(0.0, 100.0));

        Ok(report)
    }
}

impl Scorer for SentimentAnalyzer {
    type Report = SentimentReport;
    const TASK: Task = Task::Sentiment;

    fn empty_report(&self, _text: &NormalizedText) -> SentimentReport {
        SentimentReport {
            label: SentimentLabel::Neutral,
            confidence: 50.0,
            score: 0.0,
            scores: ScoreMap::certain(SentimentLabel::Neutral, &SentimentLabel::ALL),
        }
    }

    fn from_remote(
        &self,
        _text: &NormalizedText,
        output: TaskOutput,
    ) -> Result<SentimentReport, RemoteError> {
        let TaskOutput::Labels(labels) = output else {
            return Err(RemoteError::InvalidPayload(
                "expected label scores for sentiment".to_string(),
            ));
        };

        let known = labels
            .iter()
            .filter_map(|ls| SentimentLabel::from_label(&ls.label).map(|l| (l, ls.score)));
        let scores = ScoreMap::normalize(known)
            .ok_or_else(|| {
                RemoteError::InvalidPayload("no recognised sentiment labels".to_string())
            })?
            .with_categories(&SentimentLabel::ALL);

        Ok(SentimentReport::from_distribution(scores))
    }

    fn local_stages(&self) -> Vec<Stage<Self>> {
        vec![
            Stage::new(Method::PatternMatching, Self::pattern_stage),
            Stage::new(Method::Heuristic, Self::heuristic_stage),
        ]
    }
}
