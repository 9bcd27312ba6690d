//! Text statistics and the overall quality score.
//!
//! Lexical diversity is the share of distinct terms, as a percentage. The quality
//! score starts at 50 and moves with sentiment and vocabulary.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::preprocess::NormalizedText;
use super::results::round2;
use super::sentiment::SentimentLabel;

/// Words per minute used for the reading time estimate
const READING_SPEED_WPM: f64 = 200.0;

/// Metrics about the analyzed text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStatistics {
    /// Whitespace-separated words of the cleaned text
    pub word_count: usize,
    /// Characters of the cleaned text
    pub char_count: usize,
    pub sentence_count: usize,
    /// Distinct alphanumeric terms
    pub unique_words: usize,
    /// unique / total terms, in percent
    pub lexical_diversity: f64,
    /// Average term length in characters
    pub avg_word_length: f64,
    pub reading_time_minutes: f64,
}

impl TextStatistics {
    pub fn compute(text: &NormalizedText) -> Self {
        let terms: Vec<&str> = text.terms().collect();
        if terms.is_empty() {
            return Self {
                word_count: text.word_count(),
                char_count: text.clean.chars().count(),
                sentence_count: text.sentence_count(),
                unique_words: 0,
                lexical_diversity: 0.0,
                avg_word_length: 0.0,
                reading_time_minutes: round2(text.word_count() as f64 / READING_SPEED_WPM),
            };
        }

        let unique: HashSet<&str> = terms.iter().copied().collect();
        let total_chars: usize = terms.iter().map(|t| t.chars().count()).sum();

        Self {
            word_count: text.word_count(),
            char_count: text.clean.chars().count(),
            sentence_count: text.sentence_count(),
            unique_words: unique.len(),
            lexical_diversity: round2(unique.len() as f64 / terms.len() as f64 * 100.0),
            avg_word_length: round2(total_chars as f64 / terms.len() as f64),
            reading_time_minutes: round2(text.word_count() as f64 / READING_SPEED_WPM),
        }
    }
}

/// Quality band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityRating {
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Poor,
    Average,
    Good,
    Excellent,
}

impl QualityRating {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => QualityRating::Excellent,
            60..=79 => QualityRating::Good,
            40..=59 => QualityRating::Average,
            20..=39 => QualityRating::Poor,
            _ => QualityRating::VeryPoor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityRating::VeryPoor => "Very Poor",
            QualityRating::Poor => "Poor",
            QualityRating::Average => "Average",
            QualityRating::Good => "Good",
            QualityRating::Excellent => "Excellent",
        }
    }

    pub fn interpretation(&self) -> &'static str {
        match self {
            QualityRating::Excellent => {
                "High quality text with positive sentiment and good vocabulary"
            }
            QualityRating::Good => "Good quality text with generally positive content",
            QualityRating::Average => "Average quality text, could be improved",
            QualityRating::Poor => "Below average text quality or negative sentiment",
            QualityRating::VeryPoor => "Poor quality text requiring significant improvement",
        }
    }
}

impl fmt::Display for QualityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    /// 0..=100
    pub score: u32,
    pub rating: QualityRating,
    pub interpretation: String,
}

impl QualityScore {
    pub fn evaluate(sentiment: SentimentLabel, lexical_diversity: f64) -> Self {
        let mut score: i32 = 50;

        match sentiment {
            SentimentLabel::Positive => score += 20,
            SentimentLabel::Negative => score -= 20,
            SentimentLabel::Neutral => {}
        }

        if lexical_diversity > 60.0 {
            score += 15;
        } else if lexical_diversity > 40.0 {
            score += 5;
        } else if lexical_diversity < 20.0 {
            score -= 10;
        }

        let score = score.clamp(0, 100) as u32;
        let rating = QualityRating::from_score(score);
        Self {
            score,
            rating,
            interpretation: rating.interpretation().to_string(),
        }
    }
}
