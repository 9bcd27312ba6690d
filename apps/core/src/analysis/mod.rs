//! # Analysis Module
//!
//! Deterministic text analysis with an optional remote first pass.
//!
//! ## Components
//! - `preprocess`: normalization and tokenization
//! - `lexicon`: sentiment, emotion and stopword tables
//! - `sentiment`, `emotion`, `keywords`, `summary`: task scorers
//! - `pipeline`: the remote → pattern → heuristic cascade
//! - `statistics`: text statistics and quality score
//! - `orchestrator`: entry points

pub mod emotion;
pub mod keywords;
pub mod lexicon;
pub mod orchestrator;
pub mod pipeline;
pub mod preprocess;
pub mod results;
pub mod sentiment;
pub mod statistics;
pub mod summary;

pub use emotion::{Emotion, EmotionAnalyzer, EmotionReport};
pub use keywords::{Keyword, KeywordExtractor, KeywordReport};
pub use lexicon::LexiconStore;
pub use orchestrator::AnalysisOrchestrator;
pub use pipeline::{Pipeline, Scorer, Stage};
pub use preprocess::{NormalizedText, Preprocessor};
pub use results::{
    Analysis, AnalysisMetadata, CombinedResult, EmotionResult, KeywordResult, Method, ScoreMap,
    SelectedResults, SentimentResult, SummaryResult, Task,
};
pub use sentiment::{SentimentAnalyzer, SentimentLabel, SentimentReport};
pub use statistics::{QualityRating, QualityScore, TextStatistics};
pub use summary::{Summarizer, SummaryReport};
