//! Extractive summarization.
//!
//! Texts of three sentences or fewer come back unchanged. Longer texts keep their
//! three best-scoring sentences, in original order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use super::pipeline::{run_local, Scorer, Stage};
use super::preprocess::{NormalizedText, Preprocessor};
use super::results::{round2, Method, SummaryResult, Task};
use crate::error::Downgrade;
use crate::remote::{RemoteError, TaskOutput};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub summary: String,
    pub original_word_count: usize,
    pub summary_word_count: usize,
    /// Percentage of words removed, 0 when nothing was removed
    pub reduction_pct: f64,
    pub sentence_count: usize,
}

impl SummaryReport {
    fn new(summary: String, summary_word_count: usize, text: &NormalizedText) -> Self {
        Self {
            reduction_pct: reduction(text.word_count(), summary_word_count),
            original_word_count: text.word_count(),
            summary_word_count,
            summary,
            sentence_count: text.sentence_count(),
        }
    }
}

fn reduction(original: usize, kept: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    round2((1.0 - kept as f64 / original as f64) * 100.0)
}

const VERBATIM_MAX_SENTENCES: usize = 3;
const SUMMARY_SENTENCES: usize = 3;

/// Extractive summarizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Summarizer {
    pre: Preprocessor,
}

impl Summarizer {
    pub fn new() -> Self {
        Self {
            pre: Preprocessor::new(),
        }
    }

    /// Local-only summary of raw text.
    pub fn summarize(&self, text: &str) -> SummaryResult {
        run_local(self, &self.pre.normalize(text))
    }

    fn word_count(&self, text: &str) -> usize {
        self.pre.clean(text).split_whitespace().count()
    }

    fn verbatim_stage(&self, text: &NormalizedText) -> Result<SummaryReport, Downgrade> {
        if text.sentence_count() > VERBATIM_MAX_SENTENCES {
            return Err(Downgrade::Declined(Method::Verbatim));
        }
        Ok(SummaryReport {
            summary: text.raw.clone(),
            original_word_count: text.word_count(),
            summary_word_count: text.word_count(),
            reduction_pct: 0.0,
            sentence_count: text.sentence_count(),
        })
    }

    fn extractive_stage(&self, text: &NormalizedText) -> Result<SummaryReport, Downgrade> {
        let last = text.sentences.len().saturating_sub(1);
        let scores: Vec<f64> = text
            .sentences
            .iter()
            .enumerate()
            .map(|(idx, sentence)| self.score_sentence(sentence, idx == 0, idx == last))
            .collect();

        let mut ranked: Vec<usize> = (0..scores.len()).collect();
        ranked.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.cmp(&b))
        });
        ranked.truncate(SUMMARY_SENTENCES);
        ranked.sort_unstable();

        let summary = ranked
            .iter()
            .map(|&idx| text.sentences[idx].as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let kept = self.word_count(&summary);

        Ok(SummaryReport::new(summary, kept, text))
    }

    fn score_sentence(&self, sentence: &str, first: bool, last: bool) -> f64 {
        let clean = self.pre.clean(sentence);
        let words: Vec<&str> = clean.split_whitespace().collect();
        let unique: HashSet<&str> = words.iter().copied().collect();

        let mut score = 0.1 * unique.len() as f64;
        if first {
            score += 3.0;
        }
        if last {
            score += 2.0;
        }
        if (15..=25).contains(&words.len()) {
            score += 2.0;
        }
        if words.len() < 5 {
            score -= 1.0;
        }
        if sentence.contains(['?', '!']) {
            score += 1.0;
        }
        score
    }
}

impl Scorer for Summarizer {
    type Report = SummaryReport;
    const TASK: Task = Task::Summary;

    fn empty_report(&self, text: &NormalizedText) -> SummaryReport {
        SummaryReport {
            summary: text.raw.clone(),
            original_word_count: 0,
            summary_word_count: 0,
            reduction_pct: 0.0,
            sentence_count: text.sentence_count(),
        }
    }

    fn from_remote(
        &self,
        text: &NormalizedText,
        output: TaskOutput,
    ) -> Result<SummaryReport, RemoteError> {
        let TaskOutput::Summary(summary) = output else {
            return Err(RemoteError::InvalidPayload("expected summary text".to_string()));
        };
        let summary = summary.trim().to_string();
        if summary.is_empty() {
            return Err(RemoteError::InvalidPayload("empty summary".to_string()));
        }

        let kept = self.word_count(&summary);
        Ok(SummaryReport::new(summary, kept, text))
    }

    fn local_stages(&self) -> Vec<Stage<Self>> {
        vec![
            Stage::new(Method::Verbatim, Self::verbatim_stage),
            Stage::new(Method::Heuristic, Self::extractive_stage),
        ]
    }

    /// Short texts are returned as-is, so there is nothing to ask the remote for.
    fn remote_eligible(&self, text: &NormalizedText) -> bool {
        text.sentence_count() > VERBATIM_MAX_SENTENCES
    }
}
