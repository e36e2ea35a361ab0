use std::sync::Arc;

use idea_scout::domain::{CommentRecord, CompetitorRecord, FeedbackRecord, ScrapingResult, SentimentLabel};
use idea_scout::modules::scraper::StaticFixtureScraper;
use idea_scout::{Config, Orchestrator};

fn feedback_with_sentiment(text: &str, source: &str, label: SentimentLabel, score: f64) -> FeedbackRecord {
    let mut record = FeedbackRecord::new(text, source, "u1");
    record.sentiment = Some(label);
    record.sentiment_score = Some(score);
    record
}

#[tokio::test]
async fn single_healthy_source_aggregates_competitors_and_feedback() {
    let mut orchestrator = Orchestrator::new(Config::default());

    let competitors = vec![
        CompetitorRecord::new("Alpha", "FakeA", "u1", 0.8),
        CompetitorRecord::new("Beta", "FakeA", "u2", 0.7),
    ];
    let feedback = vec![feedback_with_sentiment("I love Alpha", "FakeA", SentimentLabel::Positive, 0.6)];

    orchestrator.register(Arc::new(StaticFixtureScraper::new(
        "FakeA",
        ScrapingResult::success(competitors, feedback),
    )));

    let result = orchestrator.scrape("an idea about alpha").await;

    assert_eq!(result.metadata.sources_attempted, 1);
    assert_eq!(result.metadata.sources_successful, 1);
    assert_eq!(result.competitors.len(), 2);
    assert_eq!(result.feedback.len(), 1);
}

#[tokio::test]
async fn mixed_outcomes_bucket_into_successful_partial_and_failed() {
    struct PanickingScraper;

    #[async_trait::async_trait]
    impl idea_scout::orchestrator::SourceScraper for PanickingScraper {
        fn name(&self) -> &str {
            "FakeC"
        }

        fn validate_config(&self) -> bool {
            true
        }

        async fn scrape(
            &self,
            _keywords: &[idea_scout::domain::Keyword],
            _idea_text: &str,
        ) -> ScrapingResult {
            panic!("boom");
        }
    }

    let mut orchestrator = Orchestrator::new(Config::default());
    orchestrator.register(Arc::new(StaticFixtureScraper::new(
        "FakeA",
        ScrapingResult::success(vec![CompetitorRecord::new("Alpha", "FakeA", "u1", 0.8)], vec![]),
    )));
    orchestrator.register(Arc::new(StaticFixtureScraper::new(
        "FakeB",
        ScrapingResult::partial(
            vec![CompetitorRecord::new("Beta", "FakeB", "u2", 0.6)],
            vec![],
            "rate limited on 1 query",
        ),
    )));
    orchestrator.register(Arc::new(PanickingScraper));

    let result = orchestrator.scrape("an idea").await;

    assert_eq!(result.metadata.sources_successful, 1);
    assert_eq!(result.metadata.sources_partial, 1);
    assert_eq!(result.metadata.sources_failed, 1);
    assert_eq!(result.metadata.failed_sources[0].source, "FakeC");
    assert_eq!(result.metadata.failed_sources[0].error, "boom");
}

#[tokio::test]
async fn duplicate_competitors_and_noisy_text_are_cleaned_and_deduped() {
    let mut orchestrator = Orchestrator::new(Config::default());

    let competitors = vec![
        CompetitorRecord::new("<b>Alpha</b>", "FakeA", "u1", 0.8),
        CompetitorRecord::new(" alpha ", "FakeA", "u2", 0.9),
    ];

    orchestrator.register(Arc::new(StaticFixtureScraper::new(
        "FakeA",
        ScrapingResult::success(competitors, vec![]),
    )));

    let result = orchestrator.scrape("an idea").await;

    assert_eq!(result.competitors.len(), 1);
    assert_eq!(result.competitors[0].name, "Alpha");
}

#[tokio::test]
async fn negative_comments_are_categorized_into_pain_points() {
    let mut orchestrator = Orchestrator::new(Config::default());

    let mut competitor = CompetitorRecord::new("Alpha", "FakeA", "u1", 0.8);
    competitor.comments = vec![
        CommentRecord::new("The app is so slow and keeps crashing every day", 1),
        CommentRecord::new("Support never responds to my tickets", 2),
    ];

    orchestrator.register(Arc::new(StaticFixtureScraper::new(
        "FakeA",
        ScrapingResult::success(vec![competitor], vec![]),
    )));

    let result = orchestrator.scrape("an idea").await;

    let summary = result.competitors[0].sentiment_summary.as_ref().expect("summary attached");
    assert!(summary.pain_point_categories.contains_key("performance") || summary.pain_point_categories.contains_key("support"));
}

#[tokio::test]
async fn global_timeout_cancels_slow_scraper_and_reports_failure() {
    struct SlowScraper;

    #[async_trait::async_trait]
    impl idea_scout::orchestrator::SourceScraper for SlowScraper {
        fn name(&self) -> &str {
            "SlowSource"
        }

        fn validate_config(&self) -> bool {
            true
        }

        async fn scrape(
            &self,
            _keywords: &[idea_scout::domain::Keyword],
            _idea_text: &str,
        ) -> ScrapingResult {
            tokio::time::sleep(std::time::Duration::from_secs(10)).await;
            ScrapingResult::success(vec![], vec![])
        }
    }

    let mut config = Config::default();
    config.orchestrator.total_timeout_secs = 1;
    config.orchestrator.per_source_timeout_secs = 20;

    let mut orchestrator = Orchestrator::new(config);
    orchestrator.register(Arc::new(SlowScraper));

    let result = orchestrator.scrape("an idea").await;

    assert_eq!(result.metadata.sources_failed, 1);
    assert_eq!(result.metadata.failed_sources[0].error, "Timeout");
}

#[tokio::test]
async fn zero_scrapers_registered_returns_empty_aggregate() {
    let orchestrator = Orchestrator::new(Config::default());
    let result = orchestrator.scrape("an idea").await;

    assert!(result.competitors.is_empty());
    assert!(result.feedback.is_empty());
    assert_eq!(result.metadata.error.as_deref(), Some("No scrapers registered"));
}
