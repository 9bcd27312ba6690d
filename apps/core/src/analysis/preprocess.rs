//! Text normalization and tokenization.
//!
//! Every scorer works from a [`NormalizedText`], built once per request and never
//! mutated afterwards. Empty or whitespace-only input produces empty word and
//! sentence lists rather than an error.

use regex::Regex;
use std::sync::LazyLock;

// NOTE: expect() is acceptable here, the patterns are constant
static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,!?]").expect("Invalid regex: disallowed characters"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex: whitespace run"));

static ALL_CAPS_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}\b").expect("Invalid regex: all-caps token"));

/// Punctuation and casing signals scanned from the raw input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PunctuationSignals {
    pub exclamations: usize,
    pub questions: usize,
    pub ellipses: usize,
    pub caps_tokens: usize,
}

impl PunctuationSignals {
    pub fn scan(raw: &str) -> Self {
        Self {
            exclamations: raw.matches('!').count(),
            questions: raw.matches('?').count(),
            ellipses: raw.matches("...").count(),
            caps_tokens: ALL_CAPS_TOKEN.find_iter(raw).count(),
        }
    }
}

/// A request's text after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedText {
    /// Input exactly as received
    pub raw: String,
    /// Lowercased, filtered, whitespace-collapsed form
    pub clean: String,
    /// Whitespace-separated tokens of `clean`
    pub words: Vec<String>,
    /// Sentences of the raw text, original casing preserved
    pub sentences: Vec<String>,
    pub signals: PunctuationSignals,
}

impl NormalizedText {
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Alphanumeric terms of the cleaned text, punctuation removed.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        split_terms(&self.clean)
    }

    /// Mean number of words per sentence, 0 when there are no sentences.
    pub fn avg_sentence_length(&self) -> f64 {
        if self.sentences.is_empty() {
            return 0.0;
        }
        self.words.len() as f64 / self.sentences.len() as f64
    }
}

/// Splits on anything that is not alphanumeric or an underscore.
pub fn split_terms(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
}

/// Stateless text normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, raw: &str) -> NormalizedText {
        let clean = self.clean(raw);
        let words = clean.split_whitespace().map(str::to_string).collect();
        let collapsed = WHITESPACE_RUN.replace_all(raw, " ");
        let sentences = split_sentences(collapsed.trim());

        NormalizedText {
            raw: raw.to_string(),
            clean,
            words,
            sentences,
            signals: PunctuationSignals::scan(raw),
        }
    }

    /// Lowercase, strip characters outside `[\w\s.,!?]`, collapse whitespace.
    pub fn clean(&self, raw: &str) -> String {
        let lower = raw.to_lowercase();
        let filtered = DISALLOWED_CHARS.replace_all(&lower, "");
        WHITESPACE_RUN
            .replace_all(&filtered, " ")
            .trim()
            .to_string()
    }
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Sentence boundaries sit after a run of terminal punctuation that is followed by
/// whitespace, an uppercase letter, or the end of the text.
fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        current.push(chars[i]);

        if is_terminal(chars[i]) {
            while i + 1 < chars.len() && is_terminal(chars[i + 1]) {
                i += 1;
                current.push(chars[i]);
            }

            let boundary = chars
                .get(i + 1)
                .map_or(true, |next| next.is_whitespace() || next.is_uppercase());

            if boundary {
                push_sentence(&mut sentences, &current);
                current.clear();
            }
        }

        i += 1;
    }

    push_sentence(&mut sentences, &current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, candidate: &str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_and_collapses() {
        let pre = Preprocessor::new();
        assert_eq!(
            pre.clean("  Hello,   WORLD!! (really) #rust?  "),
            "hello, world!! really rust?"
        );
    }

    #[test]
    fn test_empty_input() {
        let text = Preprocessor::new().normalize("   \n\t ");
        assert!(text.is_empty());
        assert!(text.sentences.is_empty());
        assert_eq!(text.clean, "");
        assert_eq!(text.avg_sentence_length(), 0.0);
    }

    #[test]
    fn test_sentence_split() {
        let text = Preprocessor::new().normalize("First one. Second one!  Third?? Last");
        assert_eq!(
            text.sentences,
            vec!["First one.", "Second one!", "Third??", "Last"]
        );
    }

    #[test]
    fn test_sentence_split_ignores_decimals() {
        let text = Preprocessor::new().normalize("Pi is 3.14 roughly. Next sentence.");
        assert_eq!(text.sentences.len(), 2);
        assert_eq!(text.sentences[0], "Pi is 3.14 roughly.");
    }

    #[test]
    fn test_sentence_split_on_uppercase_without_space() {
        let text = Preprocessor::new().normalize("Done.Next part");
        assert_eq!(text.sentences, vec!["Done.", "Next part"]);
    }

    #[test]
    fn test_signals() {
        let signals = PunctuationSignals::scan("WHY is this SO slow?! Well... ok!");
        assert_eq!(signals.exclamations, 2);
        assert_eq!(signals.questions, 1);
        assert_eq!(signals.ellipses, 1);
        assert_eq!(signals.caps_tokens, 2);
    }

    #[test]
    fn test_terms_drop_punctuation() {
        let text = Preprocessor::new().normalize("Rust, rust! and... more");
        let terms: Vec<&str> = text.terms().collect();
        assert_eq!(terms, vec!["rust", "rust", "and", "more"]);
    }
}
