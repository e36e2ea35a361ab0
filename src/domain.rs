//! Core data model shared by every scraper and by the orchestrator's
//! post-processing pipeline.
//!
//! Field names and invariants follow the contract every `SourceScraper`
//! implementation is expected to honor: a non-empty `source`/`source_url`
//! on every record, a `confidence_score` in `[0,1]`, and a
//! `sentiment_score` in `[-1,1]`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single search keyword, lowercased and non-empty. Ordering across a
/// `Vec<Keyword>` is significant: earlier keywords carry higher priority.
pub type Keyword = String;

/// Sentiment label attached to a piece of feedback or a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Classify an average/raw score using the thresholds from the
    /// sentiment summary spec: positive above 0.1, negative below -0.1.
    pub fn from_score(score: f64) -> Self {
        if score > 0.1 {
            SentimentLabel::Positive
        } else if score < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

/// Outcome of a single scraper's `Scrape` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapingStatus {
    Success,
    PartialSuccess,
    Failed,
}

/// Job-level status surfaced to `Store::update_status`, distinct from a
/// single source's `ScrapingStatus`. The caller derives this from a
/// completed `AggregatedResult`'s metadata: `completed` when at least one
/// source succeeded and none failed, `partial_success` when mixed, `failed`
/// when none succeeded, `processing` while the job is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    PartialSuccess,
    Completed,
    Failed,
}

impl JobStatus {
    /// Derives a job-level status from the orchestrator's source-bucket
    /// counts, following §7's propagation policy: `completed` iff at least
    /// one source succeeded and none failed, `partial_success` if mixed,
    /// `failed` if none succeeded.
    pub fn from_metadata(metadata: &ResultMetadata) -> Self {
        if metadata.sources_successful == 0 {
            JobStatus::Failed
        } else if metadata.sources_failed > 0 || metadata.sources_partial > 0 {
            JobStatus::PartialSuccess
        } else {
            JobStatus::Completed
        }
    }
}

/// A comment attached to a specific competitor, emitted by a scraper's
/// `FetchDetailComments` hook (or synthesized by the orchestrator from
/// `FeedbackRecord`s the scraper already attached inline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub text: String,
    pub author: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub rating: Option<i32>,
    /// 1-based position within the source's own ranking.
    pub position: usize,
    pub sentiment: Option<SentimentLabel>,
    pub sentiment_score: Option<f64>,
    pub confidence: Option<f64>,
    /// Source-reported helpfulness signal (e.g. "N people found this
    /// helpful"), used to prioritize negative comments for pain-point
    /// extraction.
    pub helpfulness: f64,
}

impl CommentRecord {
    pub fn new(text: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            author: None,
            date: None,
            rating: None,
            position,
            sentiment: None,
            sentiment_score: None,
            confidence: None,
            helpfulness: 0.0,
        }
    }
}

/// A competitor entity surfaced by a scraper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorRecord {
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub estimated_users: Option<String>,
    pub estimated_revenue: Option<String>,
    pub pricing_model: Option<String>,
    pub source: String,
    pub source_url: String,
    pub confidence_score: f64,
    pub launch_date: Option<String>,
    pub founder_ceo: Option<String>,
    pub review_count: Option<u32>,
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
    #[serde(default)]
    pub sentiment_summary: Option<SentimentSummary>,
}

impl CompetitorRecord {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        source_url: impl Into<String>,
        confidence_score: f64,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            website: None,
            estimated_users: None,
            estimated_revenue: None,
            pricing_model: None,
            source: source.into(),
            source_url: source_url.into(),
            confidence_score: confidence_score.clamp(0.0, 1.0),
            launch_date: None,
            founder_ceo: None,
            review_count: None,
            average_rating: None,
            comments: Vec::new(),
            sentiment_summary: None,
        }
    }
}

/// A single piece of user feedback (a review, post, or comment not tied to
/// a specific competitor) surfaced by a scraper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub text: String,
    pub sentiment: Option<SentimentLabel>,
    pub sentiment_score: Option<f64>,
    pub source: String,
    pub source_url: String,
    #[serde(default)]
    pub author_info: HashMap<String, String>,
}

impl FeedbackRecord {
    pub fn new(text: impl Into<String>, source: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sentiment: None,
            sentiment_score: None,
            source: source.into(),
            source_url: source_url.into(),
            author_info: HashMap::new(),
        }
    }
}

/// A single snippet surfaced inside a `SentimentSummary` (pain point,
/// positive highlight, or neutral mention).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSnippet {
    pub text: String,
    pub author: Option<String>,
    pub rating: Option<i32>,
    pub confidence: Option<f64>,
    pub helpfulness: f64,
}

/// Per-competitor or per-job aggregated sentiment, computed post-hoc by the
/// `SummaryBuilder` from a list of comments/feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub total_comments: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    pub neutral_percentage: f64,
    pub average_sentiment_score: f64,
    pub overall_sentiment: SentimentLabel,
    #[serde(default)]
    pub pain_points: Vec<FeedbackSnippet>,
    #[serde(default)]
    pub pain_point_categories: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub positive_feedback: Vec<FeedbackSnippet>,
    #[serde(default)]
    pub neutral_feedback: Vec<FeedbackSnippet>,
}

impl SentimentSummary {
    /// The canonical empty summary returned when there is no comment data.
    pub fn empty() -> Self {
        Self {
            total_comments: 0,
            positive_count: 0,
            negative_count: 0,
            neutral_count: 0,
            positive_percentage: 0.0,
            negative_percentage: 0.0,
            neutral_percentage: 0.0,
            average_sentiment_score: 0.0,
            overall_sentiment: SentimentLabel::Neutral,
            pain_points: Vec::new(),
            pain_point_categories: HashMap::new(),
            positive_feedback: Vec::new(),
            neutral_feedback: Vec::new(),
        }
    }
}

impl Default for SentimentSummary {
    fn default() -> Self {
        Self::empty()
    }
}

/// Per-source scraper outcome, returned by `SourceScraper::scrape`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingResult {
    pub status: ScrapingStatus,
    #[serde(default)]
    pub competitors: Vec<CompetitorRecord>,
    #[serde(default)]
    pub feedback: Vec<FeedbackRecord>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ScrapingResult {
    pub fn success(competitors: Vec<CompetitorRecord>, feedback: Vec<FeedbackRecord>) -> Self {
        Self {
            status: ScrapingStatus::Success,
            competitors,
            feedback,
            error_message: None,
            metadata: HashMap::new(),
        }
    }

    pub fn partial(
        competitors: Vec<CompetitorRecord>,
        feedback: Vec<FeedbackRecord>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status: ScrapingStatus::PartialSuccess,
            competitors,
            feedback,
            error_message: Some(message.into()),
            metadata: HashMap::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ScrapingStatus::Failed,
            competitors: Vec::new(),
            feedback: Vec::new(),
            error_message: Some(message.into()),
            metadata: HashMap::new(),
        }
    }
}

/// A source bucketed as partial, with its informational message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialSourceEntry {
    pub source: String,
    pub message: String,
}

/// A source bucketed as failed, with the failure reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedSourceEntry {
    pub source: String,
    pub error: String,
}

/// Coverage metadata attached to an `AggregatedResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub job_id: Option<String>,
    pub processing_time_seconds: f64,
    pub sources_attempted: usize,
    pub sources_successful: usize,
    pub sources_partial: usize,
    pub sources_failed: usize,
    pub successful_sources: Vec<String>,
    pub partial_sources: Vec<PartialSourceEntry>,
    pub failed_sources: Vec<FailedSourceEntry>,
    pub total_competitors_found: usize,
    pub total_feedback_found: usize,
    pub completed_at: DateTime<Utc>,
    /// Set when `Scrape` hit an unexpected post-processing error or had no
    /// scrapers registered; carries a short human-readable description.
    pub error: Option<String>,
}

impl ResultMetadata {
    pub fn empty_no_scrapers() -> Self {
        Self {
            job_id: None,
            processing_time_seconds: 0.0,
            sources_attempted: 0,
            sources_successful: 0,
            sources_partial: 0,
            sources_failed: 0,
            successful_sources: Vec::new(),
            partial_sources: Vec::new(),
            failed_sources: Vec::new(),
            total_competitors_found: 0,
            total_feedback_found: 0,
            completed_at: Utc::now(),
            error: Some("No scrapers registered".to_string()),
        }
    }
}

/// The orchestrator's sole produced artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub competitors: Vec<CompetitorRecord>,
    pub feedback: Vec<FeedbackRecord>,
    pub sentiment_summary: SentimentSummary,
    pub metadata: ResultMetadata,
}

impl AggregatedResult {
    pub fn empty_no_scrapers() -> Self {
        Self {
            competitors: Vec::new(),
            feedback: Vec::new(),
            sentiment_summary: SentimentSummary::empty(),
            metadata: ResultMetadata::empty_no_scrapers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(successful: usize, partial: usize, failed: usize) -> ResultMetadata {
        let mut m = ResultMetadata::empty_no_scrapers();
        m.error = None;
        m.sources_successful = successful;
        m.sources_partial = partial;
        m.sources_failed = failed;
        m
    }

    #[test]
    fn job_status_completed_when_all_sources_succeed() {
        assert_eq!(JobStatus::from_metadata(&metadata(2, 0, 0)), JobStatus::Completed);
    }

    #[test]
    fn job_status_partial_when_mixed() {
        assert_eq!(JobStatus::from_metadata(&metadata(1, 1, 1)), JobStatus::PartialSuccess);
        assert_eq!(JobStatus::from_metadata(&metadata(1, 0, 1)), JobStatus::PartialSuccess);
    }

    #[test]
    fn job_status_failed_when_none_succeed() {
        assert_eq!(JobStatus::from_metadata(&metadata(0, 0, 2)), JobStatus::Failed);
    }

    #[test]
    fn sentiment_label_thresholds() {
        assert_eq!(SentimentLabel::from_score(0.2), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(-0.2), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_score(0.05), SentimentLabel::Neutral);
    }
}
