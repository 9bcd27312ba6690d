//! Lexicon tables for sentiment, emotion and stopword filtering.
//!
//! A [`LexiconStore`] is built once at start-up and shared read-only behind an `Arc`.
//! Term matching counts occurrences that begin at a word boundary, so `love` matches
//! `loved` and `lovely` but `hate` does not match inside `whatever`.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::info;

use super::emotion::Emotion;
use super::sentiment::SentimentLabel;
use crate::error::AppError;

const POSITIVE_TERMS: &[&str] = &[
    "good", "great", "excellent", "awesome", "fantastic", "amazing", "wonderful", "perfect",
    "love", "happy", "joy", "positive", "best", "better", "recommend", "excited", "pleased",
    "satisfied", "brilliant", "outstanding", "superb", "delight", "enjoy", "beautiful", "glad",
    "impressive", "nice", "pleasant", "success", "thank", "favorite", "incredible",
];

const NEGATIVE_TERMS: &[&str] = &[
    "bad", "poor", "terrible", "awful", "horrible", "worst", "hate", "angry", "sad",
    "disappointed", "negative", "problem", "issue", "error", "fail", "broken", "wrong",
    "useless", "annoying", "frustrated", "frustrating", "ugly", "boring", "disgusting",
    "dislike", "unhappy", "painful", "mediocre", "waste", "regret", "complaint", "worse",
];

const NEUTRAL_TERMS: &[&str] = &[
    "normal", "standard", "typical", "average", "regular", "usual", "ordinary", "neutral",
    "moderate", "adequate", "acceptable", "reasonable", "decent", "common", "mixed", "plain",
    "balanced", "objective", "factual", "general", "routine", "expected", "sufficient",
    "medium", "informative",
];

const JOY_TERMS: &[&str] = &[
    "happy", "joy", "excited", "great", "wonderful", "amazing", "fantastic", "delighted",
    "cheerful", "glad", "thrilled", "pleased", "enjoy", "funny", "smile", "laugh", "celebrate",
    "awesome", "ecstatic", "elated", "blissful", "grateful", "jolly", "yay", "hooray",
    "excellent", "proud",
];

const SADNESS_TERMS: &[&str] = &[
    "sad", "unhappy", "depressed", "miserable", "terrible", "awful", "hurt", "tears",
    "lonely", "grief", "sorrow", "heartbroken", "gloomy", "disappointed", "regret", "lost",
    "loss", "mourn", "despair", "hopeless", "melancholy", "upset", "grieving", "suffer", "crying",
    "cried",
];

const ANGER_TERMS: &[&str] = &[
    "angry", "seething", "furious", "annoyed", "frustrated", "rage", "hate", "irritated",
    "outraged", "hostile", "resent", "livid", "infuriating", "fuming", "bitter", "disgust",
    "offended", "temper", "enraged", "irate", "aggravated", "damn", "unfair",
];

const FEAR_TERMS: &[&str] = &[
    "scared", "afraid", "fear", "terrified", "anxious", "worried", "nervous", "panic",
    "frighten", "dread", "horror", "alarmed", "uneasy", "threat", "danger", "tense", "phobia",
    "petrified", "apprehensive", "insecure", "concern",
];

const SURPRISE_TERMS: &[&str] = &[
    "surprise", "shocked", "amazed", "astonished", "unexpected", "wow", "stunned", "startled",
    "sudden", "unbelievable", "incredible", "speechless", "whoa", "omg", "astounded",
    "remarkable", "bewildered", "unforeseen", "jaw dropping", "never expected",
];

const LOVE_TERMS: &[&str] = &[
    "love", "adore", "affection", "caring", "cherish", "romance", "romantic", "darling",
    "sweetheart", "passion", "devoted", "fond", "tender", "beloved", "heart", "kiss", "hugs",
    "soulmate", "admire", "warmth", "compassion", "dear", "intimate",
];

const NEUTRAL_EMOTION_TERMS: &[&str] = &[
    "unremarkable", "okay", "normal", "usual", "regular", "average", "ordinary", "standard",
    "typical", "routine", "nothing special", "whatever", "meh", "indifferent", "calm",
    "neutral", "plain", "moderate", "so so", "as expected",
];

/// Stopwords for keyword extraction
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "nor", "for", "yet", "so", "i", "you", "he", "she",
    "it", "we", "they", "me", "him", "her", "us", "them", "my", "your", "his", "its", "our",
    "their", "mine", "yours", "hers", "ours", "theirs", "this", "that", "these", "those",
    "who", "whom", "which", "what", "whose", "is", "am", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "having", "do", "does", "did", "doing", "will", "would",
    "shall", "should", "can", "could", "may", "might", "must", "in", "on", "at", "to", "from",
    "by", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "up", "down", "out", "off", "over", "under", "again",
    "further", "here", "there", "where", "when", "why", "how", "all", "each", "every", "both",
    "few", "more", "most", "other", "some", "any", "no", "not", "only", "own", "same", "than",
    "too", "very", "just", "also", "now", "then", "once", "always", "never", "if", "because",
    "as", "until", "while", "although", "though", "yes", "maybe", "of", "such", "itself",
    "myself", "yourself", "himself", "herself", "themselves", "ourselves", "said", "says",
    "get", "got", "make", "made", "like", "much", "many", "well", "even", "still", "really",
    "thing", "things", "want", "need", "know", "think", "see", "come", "going", "one",
    "let", "put", "take", "seem", "upon", "within", "without", "across", "along", "among",
    "since", "toward", "towards", "per", "via", "unless", "whether", "either", "neither",
];

/// Category → term list table.
#[derive(Debug, Clone)]
pub struct Lexicon<K> {
    entries: BTreeMap<K, Vec<String>>,
}

impl<K: Ord + Copy> Lexicon<K> {
    pub fn from_tables(tables: &[(K, &[&str])]) -> Self {
        let entries = tables
            .iter()
            .map(|(k, terms)| (*k, terms.iter().map(|t| t.to_lowercase()).collect()))
            .collect();
        Self { entries }
    }

    pub fn terms(&self, category: K) -> &[String] {
        self.entries
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn categories(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.keys().copied()
    }

    /// Replaces the term list of each listed category, lowercasing terms.
    fn override_with(&mut self, replacement: BTreeMap<K, Vec<String>>) {
        for (category, terms) in replacement {
            let terms = terms
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
            self.entries.insert(category, terms);
        }
    }

    /// Hit counts per category against already-cleaned text.
    pub fn count_matches(&self, clean: &str) -> Vec<(K, usize)> {
        self.entries
            .iter()
            .map(|(&k, terms)| (k, terms.iter().map(|t| count_term(clean, t)).sum::<usize>()))
            .collect()
    }
}

/// Counts non-overlapping occurrences of `term` that start at a word boundary.
pub fn count_term(haystack: &str, term: &str) -> usize {
    if term.is_empty() {
        return 0;
    }
    haystack
        .match_indices(term)
        .filter(|(idx, _)| {
            haystack[..*idx]
                .chars()
                .next_back()
                .map_or(true, |prev| !prev.is_alphanumeric() && prev != '_')
        })
        .count()
}

/// JSON shape accepted by [`LexiconStore::from_json_str`]; every table is optional.
#[derive(Debug, Default, Deserialize)]
struct LexiconOverrides {
    #[serde(default)]
    sentiment: Option<BTreeMap<SentimentLabel, Vec<String>>>,
    #[serde(default)]
    emotion: Option<BTreeMap<Emotion, Vec<String>>>,
    #[serde(default)]
    stopwords: Option<Vec<String>>,
}

/// Immutable lexicon tables shared by all analyzers
#[derive(Debug, Clone)]
pub struct LexiconStore {
    pub sentiment: Lexicon<SentimentLabel>,
    pub emotion: Lexicon<Emotion>,
    stopwords: HashSet<String>,
}

impl Default for LexiconStore {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LexiconStore {
    /// The compiled-in tables
    pub fn builtin() -> Self {
        let sentiment = Lexicon::from_tables(&[
            (SentimentLabel::Positive, POSITIVE_TERMS),
            (SentimentLabel::Negative, NEGATIVE_TERMS),
            (SentimentLabel::Neutral, NEUTRAL_TERMS),
        ]);

        let emotion = Lexicon::from_tables(&[
            (Emotion::Joy, JOY_TERMS),
            (Emotion::Sadness, SADNESS_TERMS),
            (Emotion::Anger, ANGER_TERMS),
            (Emotion::Fear, FEAR_TERMS),
            (Emotion::Surprise, SURPRISE_TERMS),
            (Emotion::Love, LOVE_TERMS),
            (Emotion::Neutral, NEUTRAL_EMOTION_TERMS),
        ]);

        let stopwords = STOPWORDS.iter().map(|s| s.to_string()).collect();

        Self {
            sentiment,
            emotion,
            stopwords,
        }
    }

    /// Built-in tables with any tables present in `json` replaced.
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        let overrides: LexiconOverrides = serde_json::from_str(json)?;
        let mut store = Self::builtin();

        if let Some(sentiment) = overrides.sentiment {
            store.sentiment.override_with(sentiment);
        }
        if let Some(emotion) = overrides.emotion {
            store.emotion.override_with(emotion);
        }
        if let Some(stopwords) = overrides.stopwords {
            store.stopwords = stopwords
                .into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(store)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let json = fs::read_to_string(path)?;
        let store = Self::from_json_str(&json)?;
        info!("Loaded lexicon overrides from {}", path.display());
        Ok(store)
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_term_anchors_at_word_start() {
        assert_eq!(count_term("ok fine whatever", "hate"), 0);
        assert_eq!(count_term("i loved it, lovely", "love"), 2);
        assert_eq!(count_term("glove", "love"), 0);
        assert_eq!(count_term("so so, really so so", "so so"), 2);
        assert_eq!(count_term("anything", ""), 0);
    }

    #[test]
    fn test_builtin_sizes() {
        let store = LexiconStore::builtin();
        for label in store.sentiment.categories() {
            assert!(store.sentiment.terms(label).len() >= 20, "{label:?} too small");
        }
        for emotion in store.emotion.categories() {
            let len = store.emotion.terms(emotion).len();
            assert!((20..=40).contains(&len), "{emotion:?} has {len} terms");
        }
        assert!(store.stopword_count() >= 100);
    }

    #[test]
    fn test_example_sentences_hit_expected_terms() {
        let store = LexiconStore::builtin();
        let counts = store.sentiment.count_matches("i love this! it is amazing!!");
        assert_eq!(
            counts,
            vec![
                (SentimentLabel::Positive, 2),
                (SentimentLabel::Negative, 0),
                (SentimentLabel::Neutral, 0)
            ]
        );

        let counts = store.sentiment.count_matches("ok fine whatever");
        assert!(counts.iter().all(|(_, n)| *n == 0));
    }

    #[test]
    fn test_json_overrides() {
        let json = r#"{
            "sentiment": { "positive": ["Stellar"] },
            "stopwords": ["foo", " Bar "]
        }"#;
        let store = LexiconStore::from_json_str(json).unwrap();
        assert_eq!(store.sentiment.terms(SentimentLabel::Positive), ["stellar"]);
        assert!(!store.sentiment.terms(SentimentLabel::Negative).is_empty());
        assert!(store.is_stopword("bar"));
        assert!(!store.is_stopword("the"));
        assert_eq!(store.emotion.terms(Emotion::Joy).len(), JOY_TERMS.len());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(LexiconStore::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_from_json_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "emotion": {{ "joy": ["woohoo"] }} }}"#).unwrap();

        let store = LexiconStore::from_json_file(file.path()).unwrap();
        assert_eq!(store.emotion.terms(Emotion::Joy), ["woohoo"]);
        assert_eq!(store.stopword_count(), LexiconStore::builtin().stopword_count());

        let missing = LexiconStore::from_json_file(Path::new("/nonexistent/lexicon.json"));
        assert!(matches!(missing, Err(AppError::Io(_))));
    }
}
