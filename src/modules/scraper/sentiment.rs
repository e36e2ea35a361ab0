//! Lexicon-based sentiment analysis for scraped feedback and comments
//!
//! Scores on the `[-1.0, 1.0]` scale used throughout the crate (positive
//! above 0.1, negative below -0.1, neutral otherwise), with a companion
//! `[0.0, 1.0]` confidence derived from how many lexicon keywords matched.

use serde::{Deserialize, Serialize};

use crate::domain::SentimentLabel;

/// Result of analyzing a single piece of text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: f64,
    pub confidence: f64,
    pub source: String,
    pub raw_text: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl SentimentResult {
    pub fn new(score: f64, source: &str) -> Self {
        let score = score.clamp(-1.0, 1.0);
        Self {
            label: SentimentLabel::from_score(score),
            score,
            confidence: 0.5,
            source: source.to_string(),
            raw_text: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_raw_text(mut self, text: String) -> Self {
        self.raw_text = Some(text);
        self
    }
}

/// Keyword-lexicon sentiment analyzer for user feedback about a product or
/// competitor (reviews, forum posts, comments).
pub struct SentimentAnalyzer {
    positive_keywords: Vec<String>,
    negative_keywords: Vec<String>,
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self {
            positive_keywords: vec![
                "love".to_string(),
                "great".to_string(),
                "excellent".to_string(),
                "amazing".to_string(),
                "easy".to_string(),
                "helpful".to_string(),
                "reliable".to_string(),
                "recommend".to_string(),
                "fantastic".to_string(),
                "intuitive".to_string(),
                "affordable".to_string(),
                "responsive".to_string(),
                "satisfied".to_string(),
                "worth it".to_string(),
                "game changer".to_string(),
            ],
            negative_keywords: vec![
                "hate".to_string(),
                "terrible".to_string(),
                "awful".to_string(),
                "confusing".to_string(),
                "broken".to_string(),
                "buggy".to_string(),
                "expensive".to_string(),
                "slow".to_string(),
                "frustrating".to_string(),
                "disappointed".to_string(),
                "unreliable".to_string(),
                "waste of money".to_string(),
                "support is bad".to_string(),
                "difficult".to_string(),
                "clunky".to_string(),
            ],
        }
    }

    /// Analyze a piece of text and return a full `SentimentResult`.
    pub fn analyze(&self, text: &str) -> SentimentResult {
        let text_lower = text.to_lowercase();

        let positive_count = self
            .positive_keywords
            .iter()
            .filter(|kw| text_lower.contains(kw.as_str()))
            .count();

        let negative_count = self
            .negative_keywords
            .iter()
            .filter(|kw| text_lower.contains(kw.as_str()))
            .count();

        let total = positive_count + negative_count;
        let score = if total == 0 {
            0.0
        } else {
            (positive_count as f64 - negative_count as f64) / total as f64
        };

        let confidence = if total == 0 { 0.0 } else { (total as f64 / 5.0).min(1.0) };

        SentimentResult::new(score, "keyword_analysis")
            .with_confidence(confidence)
            .with_raw_text(text.to_string())
    }

    /// Convenience accessor used when only the score is needed.
    pub fn score(&self, text: &str) -> f64 {
        self.analyze(text).score
    }

    /// Aggregate multiple sentiment results into a single confidence-
    /// weighted score.
    pub fn aggregate(&self, results: &[SentimentResult]) -> SentimentResult {
        if results.is_empty() {
            return SentimentResult::new(0.0, "aggregate");
        }

        let total_weight: f64 = results.iter().map(|r| r.confidence).sum();
        if total_weight == 0.0 {
            return SentimentResult::new(0.0, "aggregate");
        }

        let weighted_score: f64 = results.iter().map(|r| r.score * r.confidence).sum::<f64>() / total_weight;
        let avg_confidence = total_weight / results.len() as f64;

        SentimentResult::new(weighted_score, "aggregate").with_confidence(avg_confidence)
    }
}
