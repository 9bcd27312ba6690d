//! Emotion detection over seven fixed categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::lexicon::LexiconStore;
use super::pipeline::{run_local, Scorer, Stage};
use super::preprocess::{NormalizedText, Preprocessor};
use super::results::{EmotionResult, Method, ScoreMap, Task};
use crate::error::Downgrade;
use crate::remote::{RemoteError, TaskOutput};

/// Emotion category. Declaration order is the tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Love,
    Surprise,
    Anger,
    Fear,
    Sadness,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Joy,
        Emotion::Love,
        Emotion::Surprise,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Sadness,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Love => "love",
            Emotion::Surprise => "surprise",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Sadness => "sadness",
            Emotion::Neutral => "neutral",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionReport {
    pub primary: Emotion,
    /// Share of the primary emotion, in percent
    pub primary_score: f64,
    /// All seven categories, summing to 100
    pub all_scores: ScoreMap<Emotion>,
}

impl EmotionReport {
    fn from_distribution(scores: ScoreMap<Emotion>) -> Self {
        let all_scores = scores.with_categories(&Emotion::ALL);
        let (primary, primary_score) = all_scores.leader().unwrap_or((Emotion::Neutral, 0.0));
        Self {
            primary,
            primary_score,
            all_scores,
        }
    }
}

const NEUTRAL_BASELINE: f64 = 50.0;
const SHORT_TEXT_WORDS: usize = 20;
const SHORT_TEXT_SURPRISE: f64 = 15.0;
const JOY_PER_EXCLAMATION: f64 = 5.0;
const ANGER_PER_EXCLAMATION: f64 = 3.0;
const SURPRISE_PER_QUESTION: f64 = 4.0;
const SADNESS_PER_ELLIPSIS: f64 = 8.0;
const LONG_SENTENCE_WORDS: f64 = 15.0;
const LONG_SENTENCE_NEUTRAL: f64 = 10.0;

/// Emotion scorer over a shared lexicon
#[derive(Debug, Clone)]
pub struct EmotionAnalyzer {
    lexicons: Arc<LexiconStore>,
}

impl EmotionAnalyzer {
    pub fn new(lexicons: Arc<LexiconStore>) -> Self {
        Self { lexicons }
    }

    /// Local-only analysis of raw text.
    pub fn analyze(&self, text: &str) -> EmotionResult {
        run_local(self, &Preprocessor::new().normalize(text))
    }

    /// Only categories with at least one hit take part in the distribution.
    fn pattern_stage(&self, text: &NormalizedText) -> Result<EmotionReport, Downgrade> {
        let matched = self
            .lexicons
            .emotion
            .count_matches(&text.clean)
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .map(|(emotion, n)| (emotion, n as f64));

        let scores = ScoreMap::normalize(matched).ok_or(Downgrade::NoLexicalSignal)?;
        Ok(EmotionReport::from_distribution(scores))
    }

    fn heuristic_stage(&self, text: &NormalizedText) -> Result<EmotionReport, Downgrade> {
        let signals = &text.signals;
        let exclamations = signals.exclamations as f64;

        let mut neutral = NEUTRAL_BASELINE;
        if text.avg_sentence_length() > LONG_SENTENCE_WORDS {
            neutral += LONG_SENTENCE_NEUTRAL;
        }

        let mut surprise = SURPRISE_PER_QUESTION * signals.questions as f64;
        if text.word_count() < SHORT_TEXT_WORDS {
            surprise += SHORT_TEXT_SURPRISE;
        }

        let raw = [
            (Emotion::Joy, JOY_PER_EXCLAMATION * exclamations),
            (Emotion::Love, 0.0),
            (Emotion::Surprise, surprise),
            (Emotion::Anger, ANGER_PER_EXCLAMATION * exclamations),
            (Emotion::Fear, 0.0),
            (Emotion::Sadness, SADNESS_PER_ELLIPSIS * signals.ellipses as f64),
            (Emotion::Neutral, neutral),
        ];

        let scores = ScoreMap::normalize(raw).ok_or(Downgrade::NoLexicalSignal)?;
        Ok(EmotionReport::from_distribution(scores))
    }
}

impl Scorer for EmotionAnalyzer {
    type Report = EmotionReport;
    const TASK: Task = Task::Emotion;

    fn empty_report(&self, _text: &NormalizedText) -> EmotionReport {
        EmotionReport {
            primary: Emotion::Neutral,
            primary_score: 100.0,
            all_scores: ScoreMap::certain(Emotion::Neutral, &Emotion::ALL),
        }
    }

    /// Labels outside the seven categories (e.g. `disgust`) are dropped before
    /// renormalizing.
    fn from_remote(
        &self,
        _text: &NormalizedText,
        output: TaskOutput,
    ) -> Result<EmotionReport, RemoteError> {
        let TaskOutput::Labels(labels) = output else {
            return Err(RemoteError::InvalidPayload(
                "expected label scores for emotion".to_string(),
            ));
        };

        let known = labels
            .iter()
            .filter_map(|ls| Emotion::from_label(&ls.label).map(|e| (e, ls.score)));
        let scores = ScoreMap::normalize(known)
            .ok_or_else(|| {
                RemoteError::InvalidPayload("no recognised emotion labels".to_string())
            })?;

        Ok(EmotionReport::from_distribution(scores))
    }

    fn local_stages(&self) -> Vec<Stage<Self>> {
        vec![
            Stage::new(Method::PatternMatching, Self::pattern_stage),
            Stage::new(Method::Heuristic, Self::heuristic_stage),
        ]
    }
}
