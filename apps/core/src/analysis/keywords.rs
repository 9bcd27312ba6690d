//! Keyword extraction using TF-IDF.
//!
//! Scores each candidate term against the document itself:
//! `tf = freq / total`, `idf = ln(total / (freq + 1))`, `score = tf × idf × 100`.
//! Stopwords and terms of two characters or fewer are never candidates.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::lexicon::{count_term, LexiconStore};
use super::pipeline::{run_local, Scorer, Stage};
use super::preprocess::{NormalizedText, Preprocessor};
use super::results::{round2, KeywordResult, Method, Task};
use crate::error::Downgrade;
use crate::remote::{RemoteError, TaskOutput};

/// A ranked keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    /// Capitalized surface form
    pub word: String,
    /// Raw frequency in the text
    pub frequency: usize,
    /// Importance score
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordReport {
    pub keywords: Vec<Keyword>,
    pub total_keywords: usize,
    pub word_count: usize,
}

impl KeywordReport {
    fn new(keywords: Vec<Keyword>, text: &NormalizedText) -> Self {
        Self {
            total_keywords: keywords.len(),
            keywords,
            word_count: text.word_count(),
        }
    }
}

/// Keyword extractor over the shared stopword list
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    lexicons: Arc<LexiconStore>,
    min_word_length: usize,
    max_keywords: usize,
    fallback_keywords: usize,
}

impl KeywordExtractor {
    pub const MAX_KEYWORDS: usize = 15;
    pub const FALLBACK_KEYWORDS: usize = 5;

    /// Create a keyword extractor with default settings
    pub fn new(lexicons: Arc<LexiconStore>) -> Self {
        Self {
            lexicons,
            min_word_length: 3,
            max_keywords: Self::MAX_KEYWORDS,
            fallback_keywords: Self::FALLBACK_KEYWORDS,
        }
    }

    /// Local-only extraction from raw text.
    pub fn extract(&self, text: &str) -> KeywordResult {
        run_local(self, &Preprocessor::new().normalize(text))
    }

    fn is_candidate(&self, word: &str) -> bool {
        word.chars().count() >= self.min_word_length && !self.lexicons.is_stopword(word)
    }

    /// TF-IDF over the filtered candidates.
    fn tfidf_stage(&self, text: &NormalizedText) -> Result<KeywordReport, Downgrade> {
        let terms: Vec<&str> = text.terms().collect();
        let total_words = terms.len() as f64;

        let freq = count_frequencies(terms.iter().copied().filter(|t| self.is_candidate(t)));
        if freq.is_empty() {
            return Err(Downgrade::Declined(Method::PatternMatching));
        }

        let mut scored: Vec<(&str, usize, f64)> = freq
            .into_iter()
            .map(|(word, count)| {
                let tf = count as f64 / total_words;
                let idf = (total_words / (count as f64 + 1.0)).ln();
                (word, count, tf * idf * 100.0)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.1.cmp(&a.1))
                .then_with(|| a.0.cmp(&b.0))
        });

        let keywords = scored
            .into_iter()
            .take(self.max_keywords)
            .map(|(word, frequency, score)| Keyword {
                word: capitalize(word),
                frequency,
                score: round2(score),
            })
            .collect();

        Ok(KeywordReport::new(keywords, text))
    }

    /// Most frequent tokens of four or more characters, stopwords included. Shorter
    /// tokens are only considered when nothing longer exists.
    fn frequency_stage(&self, text: &NormalizedText) -> Result<KeywordReport, Downgrade> {
        let terms: Vec<&str> = text.terms().collect();
        if terms.is_empty() {
            return Err(Downgrade::Declined(Method::Heuristic));
        }
        let total_words = terms.len() as f64;

        let mut freq = count_frequencies(terms.iter().copied().filter(|t| t.chars().count() > 3));
        if freq.is_empty() {
            freq = count_frequencies(terms.iter().copied());
        }

        let mut ranked: Vec<(&str, usize)> = freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let keywords = ranked
            .into_iter()
            .take(self.fallback_keywords)
            .map(|(word, frequency)| Keyword {
                word: capitalize(word),
                frequency,
                score: round2(frequency as f64 / total_words * 100.0),
            })
            .collect();

        Ok(KeywordReport::new(keywords, text))
    }
}

fn count_frequencies<'a>(words: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    let mut freq = HashMap::new();
    for word in words {
        *freq.entry(word).or_insert(0) += 1;
    }
    freq
}

/// Uppercases the first character.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Scorer for KeywordExtractor {
    type Report = KeywordReport;
    const TASK: Task = Task::Keywords;

    fn empty_report(&self, text: &NormalizedText) -> KeywordReport {
        KeywordReport::new(Vec::new(), text)
    }

    /// Remote keywords go through the same candidate filter as local ones.
    fn from_remote(
        &self,
        text: &NormalizedText,
        output: TaskOutput,
    ) -> Result<KeywordReport, RemoteError> {
        let TaskOutput::Keywords(remote) = output else {
            return Err(RemoteError::InvalidPayload(
                "expected keyword list".to_string(),
            ));
        };

        let mut seen = HashSet::new();
        let keywords: Vec<Keyword> = remote
            .into_iter()
            .filter_map(|kw| {
                let word = kw.word.trim().to_lowercase();
                if !self.is_candidate(&word) || !seen.insert(word.clone()) {
                    return None;
                }
                Some(Keyword {
                    frequency: count_term(&text.clean, &word),
                    word: capitalize(&word),
                    score: round2(kw.score * 100.0),
                })
            })
            .take(self.max_keywords)
            .collect();

        if keywords.is_empty() {
            return Err(RemoteError::InvalidPayload(
                "no usable keywords in response".to_string(),
            ));
        }
        Ok(KeywordReport::new(keywords, text))
    }

    fn local_stages(&self) -> Vec<Stage<Self>> {
        vec![
            Stage::new(Method::PatternMatching, Self::tfidf_stage),
            Stage::new(Method::Heuristic, Self::frequency_stage),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteKeyword;

    fn extractor() -> KeywordExtractor {
        KeywordExtractor::new(Arc::new(LexiconStore::builtin()))
    }

    #[test]
    fn test_keyword_extraction() {
        let text = "Rust makes systems programming safe. Rust programs are fast, \
                    and the compiler catches memory bugs before the programs run.";
        let result = extractor().extract(text);

        assert_eq!(result.method, Method::PatternMatching);
        let words: Vec<&str> = result.report.keywords.iter().map(|k| k.word.as_str()).collect();
        // equal scores and frequencies fall back to alphabetical order
        assert_eq!(&words[..2], &["Programs", "Rust"]);
        assert_eq!(result.report.keywords[1].frequency, 2);
        assert_eq!(result.report.keywords[1].score, 19.43);
        assert!(words.contains(&"Compiler"));
        assert_eq!(result.report.total_keywords, result.report.keywords.len());
    }

    #[test]
    fn test_ties_break_alphabetically() {
        let result = extractor().extract("zebra apple mango");
        let words: Vec<&str> = result.report.keywords.iter().map(|k| k.word.as_str()).collect();
        assert_eq!(words, vec!["Apple", "Mango", "Zebra"]);
    }

    #[test]
    fn test_candidates_filtered() {
        let store = LexiconStore::builtin();
        let text = "It is an ox in a box on the hill, and the hill is by the big old mill. \
                    Every wheel turns; the miller sells flour, grain, bread and cakes daily.";
        let result = extractor().extract(text);

        assert!(result.report.keywords.len() <= 15);
        for kw in &result.report.keywords {
            let lower = kw.word.to_lowercase();
            assert!(lower.chars().count() > 2, "{} too short", kw.word);
            assert!(!store.is_stopword(&lower), "{} is a stopword", kw.word);
        }
    }

    #[test]
    fn test_cap_at_fifteen() {
        let text = (1..=30)
            .map(|i| format!("term{:02}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let result = extractor().extract(&text);
        assert_eq!(result.report.keywords.len(), 15);
        assert_eq!(result.report.keywords[0].word, "Term01");
    }

    #[test]
    fn test_stopwords_only_falls_back() {
        let result = extractor().extract("the the the and and and");
        assert_eq!(result.method, Method::Heuristic);
        let words: Vec<&str> = result.report.keywords.iter().map(|k| k.word.as_str()).collect();
        assert_eq!(words, vec!["And", "The"]);
        assert_eq!(result.report.keywords[0].frequency, 3);
        assert_eq!(result.report.keywords[0].score, 50.0);
    }

    #[test]
    fn test_fallback_prefers_longer_tokens() {
        let result = extractor().extract("because because about the the the");
        assert_eq!(result.method, Method::Heuristic);
        let words: Vec<&str> = result.report.keywords.iter().map(|k| k.word.as_str()).collect();
        assert_eq!(words, vec!["Because", "About"]);
    }

    #[test]
    fn test_empty_text() {
        let result = extractor().extract("   ");
        assert_eq!(result.method, Method::EmptyInput);
        assert!(result.report.keywords.is_empty());

        let result = extractor().extract("... !!");
        assert_eq!(result.method, Method::EmptyInput);
        assert_eq!(result.report.word_count, 2);
    }

    #[test]
    fn test_remote_keywords_filtered() {
        let text = Preprocessor::new().normalize("Tokio runtime and the tokio scheduler");
        let output = TaskOutput::Keywords(vec![
            RemoteKeyword {
                word: "Tokio".to_string(),
                score: 0.91,
            },
            RemoteKeyword {
                word: "the".to_string(),
                score: 0.5,
            },
            RemoteKeyword {
                word: "tokio".to_string(),
                score: 0.4,
            },
        ]);
        let report = extractor().from_remote(&text, output).unwrap();
        assert_eq!(report.keywords.len(), 1);
        assert_eq!(report.keywords[0].word, "Tokio");
        assert_eq!(report.keywords[0].frequency, 2);
        assert_eq!(report.keywords[0].score, 91.0);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("élan"), "Élan");
        assert_eq!(capitalize(""), "");
    }
}
