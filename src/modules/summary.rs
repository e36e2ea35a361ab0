//! Builds cross-source and per-competitor sentiment summaries, including
//! pain-point categorization of negative comments.

use crate::domain::{
    CommentRecord, FeedbackRecord, FeedbackSnippet, SentimentLabel, SentimentSummary,
};

/// Ordered keyword sets for pain-point categorization. First match wins;
/// a negative comment matching none of these falls into `other`.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "usability",
        &["confusing", "difficult", "hard to use", "complicated", "interface", "ui", "ux", "navigation"],
    ),
    (
        "performance",
        &["slow", "crash", "freeze", "lag", "loading", "speed", "performance", "battery"],
    ),
    (
        "features",
        &["missing", "lack", "need", "want", "feature", "functionality", "option"],
    ),
    (
        "pricing",
        &["expensive", "price", "cost", "money", "subscription", "payment", "billing"],
    ),
    (
        "support",
        &["support", "help", "customer service", "response", "contact"],
    ),
    (
        "bugs",
        &["bug", "error", "broken", "issue", "problem", "glitch", "not working"],
    ),
];

const CATEGORY_SNIPPET_LEN: usize = 80;
const PAIN_POINT_SNIPPET_LEN: usize = 200;
const MAX_PAIN_POINTS: usize = 5;
const MAX_HIGHLIGHT_FEEDBACK: usize = 2;

pub struct SummaryBuilder;

impl SummaryBuilder {
    /// Cross-source sentiment summary over a flat feedback list.
    ///
    /// Feedback without a computed `sentiment`/`sentiment_score` is
    /// excluded from the counts — the orchestrator attaches sentiment to
    /// every feedback record before calling this.
    pub fn summarize_feedback(feedback: &[FeedbackRecord]) -> SentimentSummary {
        let scored: Vec<(SentimentLabel, f64)> = feedback
            .iter()
            .filter_map(|f| match (f.sentiment, f.sentiment_score) {
                (Some(label), Some(score)) => Some((label, score)),
                _ => None,
            })
            .collect();

        Self::summarize_scored(&scored)
    }

    /// Per-competitor sentiment summary over its attached comments, with
    /// pain-point categorization of negative comments.
    pub fn summarize_comments(comments: &[CommentRecord]) -> SentimentSummary {
        let scored: Vec<(SentimentLabel, f64)> = comments
            .iter()
            .filter_map(|c| match (c.sentiment, c.sentiment_score) {
                (Some(label), Some(score)) => Some((label, score)),
                _ => None,
            })
            .collect();

        let mut summary = Self::summarize_scored(&scored);

        let mut categories: std::collections::HashMap<String, Vec<String>> =
            std::collections::HashMap::new();
        let mut pain_points = Vec::new();
        let mut positive_feedback = Vec::new();
        let mut neutral_feedback = Vec::new();

        // `comments` arrives pre-sorted (negative first, then neutral, then
        // positive; helpfulness descending within each group), so taking
        // the first few of each label already yields the highest-priority
        // items.
        for comment in comments {
            let snippet = || FeedbackSnippet {
                text: truncate(&comment.text, PAIN_POINT_SNIPPET_LEN),
                author: comment.author.clone(),
                rating: comment.rating,
                confidence: comment.confidence,
                helpfulness: comment.helpfulness,
            };

            match comment.sentiment {
                Some(SentimentLabel::Negative) => {
                    if pain_points.len() < MAX_PAIN_POINTS {
                        pain_points.push(snippet());
                    }
                    let category = categorize(&comment.text);
                    categories
                        .entry(category.to_string())
                        .or_default()
                        .push(truncate(&comment.text, CATEGORY_SNIPPET_LEN));
                }
                Some(SentimentLabel::Positive) => {
                    if positive_feedback.len() < MAX_HIGHLIGHT_FEEDBACK {
                        positive_feedback.push(snippet());
                    }
                }
                Some(SentimentLabel::Neutral) | None => {
                    if neutral_feedback.len() < MAX_HIGHLIGHT_FEEDBACK {
                        neutral_feedback.push(snippet());
                    }
                }
            }
        }

        summary.pain_points = pain_points;
        summary.pain_point_categories = categories;
        summary.positive_feedback = positive_feedback;
        summary.neutral_feedback = neutral_feedback;
        summary
    }

    /// Orders a competitor's comments for emission: negatives first, then
    /// neutrals, then positives; within each group by helpfulness
    /// descending, then rating ascending.
    pub fn order_comments(mut comments: Vec<CommentRecord>) -> Vec<CommentRecord> {
        comments.sort_by(|a, b| {
            group_rank(a.sentiment)
                .cmp(&group_rank(b.sentiment))
                .then(b.helpfulness.partial_cmp(&a.helpfulness).unwrap_or(std::cmp::Ordering::Equal))
                .then(a.rating.unwrap_or(0).cmp(&b.rating.unwrap_or(0)))
        });
        comments
    }

    fn summarize_scored(scored: &[(SentimentLabel, f64)]) -> SentimentSummary {
        let total = scored.len();
        if total == 0 {
            return SentimentSummary::empty();
        }

        let positive_count = scored.iter().filter(|(l, _)| *l == SentimentLabel::Positive).count();
        let negative_count = scored.iter().filter(|(l, _)| *l == SentimentLabel::Negative).count();
        let neutral_count = total - positive_count - negative_count;

        let round2 = |v: f64| (v * 100.0).round() / 100.0;
        let positive_percentage = round2(positive_count as f64 / total as f64 * 100.0);
        let negative_percentage = round2(negative_count as f64 / total as f64 * 100.0);
        let neutral_percentage = round2(neutral_count as f64 / total as f64 * 100.0);

        let sum: f64 = scored.iter().map(|(_, s)| s).sum();
        let average_raw = sum / total as f64;
        let average_sentiment_score = (average_raw * 10_000.0).round() / 10_000.0;

        let overall_sentiment = SentimentLabel::from_score(average_sentiment_score);

        SentimentSummary {
            total_comments: total,
            positive_count,
            negative_count,
            neutral_count,
            positive_percentage,
            negative_percentage,
            neutral_percentage,
            average_sentiment_score,
            overall_sentiment,
            pain_points: Vec::new(),
            pain_point_categories: std::collections::HashMap::new(),
            positive_feedback: Vec::new(),
            neutral_feedback: Vec::new(),
        }
    }
}

fn group_rank(sentiment: Option<SentimentLabel>) -> u8 {
    match sentiment {
        Some(SentimentLabel::Negative) => 0,
        Some(SentimentLabel::Neutral) | None => 1,
        Some(SentimentLabel::Positive) => 2,
    }
}

fn categorize(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    for (category, keywords) in CATEGORIES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return category;
        }
    }
    "other"
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        text.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommentRecord;

    fn feedback(label: SentimentLabel, score: f64) -> FeedbackRecord {
        let mut record = FeedbackRecord::new("some feedback text", "FakeA", "u1");
        record.sentiment = Some(label);
        record.sentiment_score = Some(score);
        record
    }

    #[test]
    fn empty_feedback_yields_canonical_empty_summary() {
        let summary = SummaryBuilder::summarize_feedback(&[]);
        assert_eq!(summary.total_comments, 0);
        assert_eq!(summary.overall_sentiment, SentimentLabel::Neutral);
    }

    #[test]
    fn counts_and_percentages() {
        let feedback_list = vec![
            feedback(SentimentLabel::Positive, 0.6),
            feedback(SentimentLabel::Positive, 0.8),
            feedback(SentimentLabel::Negative, -0.5),
            feedback(SentimentLabel::Neutral, 0.0),
        ];
        let summary = SummaryBuilder::summarize_feedback(&feedback_list);
        assert_eq!(summary.total_comments, 4);
        assert_eq!(summary.positive_count, 2);
        assert_eq!(summary.negative_count, 1);
        assert_eq!(summary.neutral_count, 1);
        assert_eq!(summary.positive_percentage, 50.0);
    }

    #[test]
    fn overall_sentiment_thresholds() {
        let positive_leaning = vec![feedback(SentimentLabel::Positive, 0.5)];
        assert_eq!(
            SummaryBuilder::summarize_feedback(&positive_leaning).overall_sentiment,
            SentimentLabel::Positive
        );

        let negative_leaning = vec![feedback(SentimentLabel::Negative, -0.5)];
        assert_eq!(
            SummaryBuilder::summarize_feedback(&negative_leaning).overall_sentiment,
            SentimentLabel::Negative
        );
    }

    #[test]
    fn categorizes_pain_points() {
        let mut comment = CommentRecord::new("The app is so slow and keeps crashing", 1);
        comment.sentiment = Some(SentimentLabel::Negative);
        comment.sentiment_score = Some(-0.7);

        let summary = SummaryBuilder::summarize_comments(&[comment]);
        assert!(summary.pain_point_categories.contains_key("performance"));
    }

    #[test]
    fn orders_comments_negative_first_then_by_helpfulness() {
        let mut positive = CommentRecord::new("Love it", 1);
        positive.sentiment = Some(SentimentLabel::Positive);
        positive.helpfulness = 10.0;

        let mut negative_low_help = CommentRecord::new("Buggy", 2);
        negative_low_help.sentiment = Some(SentimentLabel::Negative);
        negative_low_help.helpfulness = 1.0;

        let mut negative_high_help = CommentRecord::new("Crashes constantly", 3);
        negative_high_help.sentiment = Some(SentimentLabel::Negative);
        negative_high_help.helpfulness = 20.0;

        let ordered = SummaryBuilder::order_comments(vec![positive, negative_low_help, negative_high_help]);
        assert_eq!(ordered[0].text, "Crashes constantly");
        assert_eq!(ordered[1].text, "Buggy");
        assert_eq!(ordered[2].text, "Love it");
    }

    #[test]
    fn pain_point_scenario_categorizes_and_orders_and_highlights() {
        let mut crash = CommentRecord::new("App keeps crashing when I open it", 1);
        crash.sentiment = Some(SentimentLabel::Negative);
        crash.helpfulness = 5.0;

        let mut pricing = CommentRecord::new("Too expensive for what it offers", 2);
        pricing.sentiment = Some(SentimentLabel::Negative);
        pricing.helpfulness = 3.0;

        let mut usability = CommentRecord::new("Confusing navigation", 3);
        usability.sentiment = Some(SentimentLabel::Negative);
        usability.helpfulness = 1.0;

        let mut positive = CommentRecord::new("Love the new feature", 4);
        positive.sentiment = Some(SentimentLabel::Positive);

        let ordered = SummaryBuilder::order_comments(vec![positive, crash, pricing, usability]);
        assert_eq!(ordered[3].text, "Love the new feature");

        let summary = SummaryBuilder::summarize_comments(&ordered);
        assert!(summary.pain_point_categories.contains_key("performance"));
        assert!(summary.pain_point_categories.contains_key("pricing"));
        assert!(summary.pain_point_categories.contains_key("usability"));
        assert_eq!(summary.positive_feedback.len(), 1);
        assert_eq!(summary.positive_feedback[0].text, "Love the new feature");
        assert_eq!(summary.pain_points.len(), 3);
    }

    #[test]
    fn caps_pain_points_at_five() {
        let mut comments = Vec::new();
        for i in 0..8 {
            let mut c = CommentRecord::new(format!("This is broken issue number {i}"), i);
            c.sentiment = Some(SentimentLabel::Negative);
            comments.push(c);
        }
        let summary = SummaryBuilder::summarize_comments(&comments);
        assert_eq!(summary.pain_points.len(), 5);
    }
}
