//! The scraping orchestrator: fans a set of keywords out to every
//! registered `SourceScraper`, enforces a bounded concurrency pool and a
//! global deadline, and runs the aggregated results through cleaning,
//! deduplication, and sentiment summarization.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{
    AggregatedResult, CommentRecord, CompetitorRecord, FailedSourceEntry, FeedbackRecord,
    Keyword, PartialSourceEntry, ResultMetadata, ScrapingResult, ScrapingStatus, SentimentSummary,
};
use crate::modules::cleaner;
use crate::modules::dedup::Deduplicator;
use crate::modules::keywords::KeywordExtractor;
use crate::modules::scraper::sentiment::SentimentAnalyzer;
use crate::modules::summary::SummaryBuilder;

/// Number of top competitors the orchestrator will try to enrich with a
/// scraper's optional `fetch_detail_comments` hook.
const MAX_DETAIL_FETCH_COMPETITORS: usize = 3;

/// Contract every per-source data collector implements.
#[async_trait]
pub trait SourceScraper: Send + Sync {
    /// Stable human identifier used in metadata and logs.
    fn name(&self) -> &str;

    /// Verifies the scraper's own configuration (keys, limits, language
    /// lists) is present and coherent. Called once, at registration.
    fn validate_config(&self) -> bool;

    /// Runs the scrape for this source. Must not raise for expected
    /// failures (rate limits, 404s, empty results) — those should surface
    /// as `ScrapingResult::partial` or `ScrapingResult::failed` instead.
    async fn scrape(&self, keywords: &[Keyword], idea_text: &str) -> ScrapingResult;

    /// Optional hook: enrich a top competitor with detailed comments.
    /// Default implementation reports no additional comments.
    async fn fetch_detail_comments(&self, _competitor: &CompetitorRecord) -> Vec<CommentRecord> {
        Vec::new()
    }

    /// Optional hook: release any resources held for this scrape (open
    /// sessions, connection pools). Called once per `scrape()` call, on
    /// every registered scraper, even when that scraper's own task was
    /// cancelled by the global deadline. Default is a no-op.
    async fn close(&self) {}
}

/// Coordinates scraper registration and fan-out scraping runs.
pub struct Orchestrator {
    config: Config,
    scrapers: Vec<Arc<dyn SourceScraper>>,
    sentiment: SentimentAnalyzer,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            scrapers: Vec::new(),
            sentiment: SentimentAnalyzer::new(),
        }
    }

    /// Registers a scraper after validating its configuration. Rejected
    /// scrapers are logged and skipped, never causing `register` itself
    /// to fail. Re-registering the same name is a no-op.
    pub fn register(&mut self, scraper: Arc<dyn SourceScraper>) {
        let name = scraper.name().to_string();

        if self.scrapers.iter().any(|s| s.name() == name) {
            return;
        }

        if !scraper.validate_config() {
            warn!(source = %name, "scraper rejected at registration: invalid configuration");
            return;
        }

        info!(source = %name, "scraper registered");
        self.scrapers.push(scraper);
    }

    /// Names of every currently registered scraper, in registration order.
    pub fn list_sources(&self) -> Vec<String> {
        self.scrapers.iter().map(|s| s.name().to_string()).collect()
    }

    /// Fans `idea_text` out to every registered scraper and returns the
    /// aggregated, cleaned, deduplicated, and sentiment-annotated result.
    pub async fn scrape(&self, idea_text: &str) -> AggregatedResult {
        let start = Instant::now();

        if self.scrapers.is_empty() {
            return AggregatedResult::empty_no_scrapers();
        }

        let keywords = KeywordExtractor::extract(idea_text);
        let semaphore = Arc::new(Semaphore::new(self.config.orchestrator.max_concurrent_scrapers));
        let per_source_timeout = self.config.orchestrator.per_source_timeout();

        let mut pending: HashSet<String> = self.list_sources().into_iter().collect();
        let mut join_set: JoinSet<(String, ScrapingResult)> = JoinSet::new();
        // `JoinError` carries a task id but not the task's own captured
        // state, so a panicking scraper's name has to be recovered from
        // this side table rather than from the join error itself.
        let mut task_names: HashMap<tokio::task::Id, String> = HashMap::new();

        for scraper in &self.scrapers {
            let source_name = scraper.name().to_string();
            let scraper = Arc::clone(scraper);
            let semaphore = Arc::clone(&semaphore);
            let keywords = keywords.clone();
            let idea_text = idea_text.to_string();

            let handle = join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
                let name = scraper.name().to_string();

                match tokio::time::timeout(per_source_timeout, scraper.scrape(&keywords, &idea_text)).await {
                    Ok(result) => (name, result),
                    Err(_) => (name, ScrapingResult::failed("Timeout")),
                }
            });
            task_names.insert(handle.id(), source_name);
        }

        let mut successful_sources = Vec::new();
        let mut partial_sources = Vec::new();
        let mut failed_sources = Vec::new();
        let mut all_competitors = Vec::new();
        let mut all_feedback = Vec::new();

        let total_timeout = self.config.orchestrator.total_timeout();
        let drain = tokio::time::timeout(total_timeout, async {
            while let Some(outcome) = join_set.join_next().await {
                match outcome {
                    Ok((name, result)) => {
                        pending.remove(&name);
                        Self::bucket_result(
                            name,
                            result,
                            &mut successful_sources,
                            &mut partial_sources,
                            &mut failed_sources,
                            &mut all_competitors,
                            &mut all_feedback,
                        );
                    }
                    Err(join_error) => {
                        let name = task_names
                            .get(&join_error.id())
                            .cloned()
                            .unwrap_or_else(|| "unknown".to_string());
                        pending.remove(&name);
                        let message = panic_message(join_error);
                        warn!(source = %name, error = %message, "scraper task panicked");
                        failed_sources.push(FailedSourceEntry { source: name, error: message });
                    }
                }
            }
        })
        .await;

        if drain.is_err() {
            warn!(remaining = pending.len(), "global scrape deadline exceeded; cancelling remaining scrapers");
            join_set.abort_all();
            for name in pending {
                failed_sources.push(FailedSourceEntry { source: name, error: "Timeout".to_string() });
            }
        }

        let sources_attempted = self.scrapers.len();
        let sources_successful = successful_sources.len();
        let sources_partial = partial_sources.len();
        let sources_failed = failed_sources.len();

        let closes = self.scrapers.iter().map(|s| s.close());
        futures::future::join_all(closes).await;

        // Post-processing runs on data already collected, not external I/O,
        // but a bug in the cleaner/dedup/summary chain must not unwind past
        // `scrape` — the spec's core guarantee is that a job always
        // terminates with an `AggregatedResult`, preserving whatever
        // per-source buckets were already gathered.
        let post_process_outcome =
            std::panic::AssertUnwindSafe(self.post_process(all_competitors, all_feedback))
                .catch_unwind()
                .await;

        let (aggregated_competitors, feedback, sentiment_summary, post_process_error) =
            match post_process_outcome {
                Ok((competitors, feedback, summary)) => (competitors, feedback, summary, None),
                Err(panic) => {
                    let message = describe_panic(panic);
                    warn!(error = %message, "post-processing failed; returning empty aggregate");
                    (Vec::new(), Vec::new(), SentimentSummary::empty(), Some(message))
                }
            };

        let total_competitors_found = aggregated_competitors.len();
        let total_feedback_found = feedback.len();

        AggregatedResult {
            competitors: aggregated_competitors,
            feedback,
            sentiment_summary,
            metadata: ResultMetadata {
                job_id: None,
                processing_time_seconds: start.elapsed().as_secs_f64(),
                sources_attempted,
                sources_successful,
                sources_partial,
                sources_failed,
                successful_sources,
                partial_sources,
                failed_sources,
                total_competitors_found,
                total_feedback_found,
                completed_at: chrono::Utc::now(),
                error: post_process_error,
            },
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn bucket_result(
        name: String,
        result: ScrapingResult,
        successful_sources: &mut Vec<String>,
        partial_sources: &mut Vec<PartialSourceEntry>,
        failed_sources: &mut Vec<FailedSourceEntry>,
        all_competitors: &mut Vec<CompetitorRecord>,
        all_feedback: &mut Vec<FeedbackRecord>,
    ) {
        match result.status {
            ScrapingStatus::Success => {
                successful_sources.push(name);
            }
            ScrapingStatus::PartialSuccess => {
                partial_sources.push(PartialSourceEntry {
                    source: name,
                    message: result.error_message.clone().unwrap_or_default(),
                });
            }
            ScrapingStatus::Failed => {
                failed_sources.push(FailedSourceEntry {
                    source: name,
                    error: result.error_message.clone().unwrap_or_default(),
                });
            }
        }

        all_competitors.extend(result.competitors);
        all_feedback.extend(result.feedback);
    }

    /// Runs the fixed post-processing pipeline: clean, dedup, attach
    /// sentiment, build per-competitor and cross-source summaries. Always
    /// runs, even when every source failed.
    async fn post_process(
        &self,
        competitors: Vec<CompetitorRecord>,
        feedback: Vec<FeedbackRecord>,
    ) -> (Vec<CompetitorRecord>, Vec<FeedbackRecord>, crate::domain::SentimentSummary) {
        let cleaned_competitors = cleaner::clean_competitors(competitors);
        let cleaned_feedback = cleaner::clean_feedback(feedback);

        let deduped_competitors = Deduplicator::dedup_competitors(cleaned_competitors);
        let mut deduped_feedback = Deduplicator::dedup_feedback(cleaned_feedback);

        for record in deduped_feedback.iter_mut() {
            if record.sentiment.is_none() || record.sentiment_score.is_none() {
                let analyzed = self.sentiment.analyze(&record.text);
                record.sentiment = Some(analyzed.label);
                record.sentiment_score = Some(analyzed.score);
            }
        }

        let mut competitors = deduped_competitors;
        self.fetch_detail_comments(&mut competitors).await;

        let mut competitors_with_summaries = Vec::new();
        for mut competitor in competitors {
            for comment in competitor.comments.iter_mut() {
                if comment.sentiment.is_none() || comment.sentiment_score.is_none() {
                    let analyzed = self.sentiment.analyze(&comment.text);
                    comment.sentiment = Some(analyzed.label);
                    comment.sentiment_score = Some(analyzed.score);
                    comment.confidence = Some(analyzed.confidence);
                }
            }
            competitor.comments = SummaryBuilder::order_comments(competitor.comments);
            competitor.sentiment_summary = Some(SummaryBuilder::summarize_comments(&competitor.comments));

            competitors_with_summaries.push(competitor);
        }

        let cross_source_summary = SummaryBuilder::summarize_feedback(&deduped_feedback);

        (competitors_with_summaries, deduped_feedback, cross_source_summary)
    }

    /// Enriches up to `MAX_DETAIL_FETCH_COMPETITORS` competitors that
    /// arrived with no attached comments by calling their scraper's
    /// optional detail-comment hook. Not subject to the global deadline —
    /// it runs after fan-out completes, against data already in memory.
    /// The hooks themselves run concurrently, since each scraper's own
    /// rate limiter already paces its outbound calls.
    async fn fetch_detail_comments(&self, competitors: &mut [CompetitorRecord]) {
        let targets: Vec<(usize, Arc<dyn SourceScraper>, CompetitorRecord)> = competitors
            .iter()
            .enumerate()
            .filter(|(_, c)| c.comments.is_empty())
            .filter_map(|(i, c)| {
                self.scrapers
                    .iter()
                    .find(|s| s.name() == c.source.as_str())
                    .map(|s| (i, Arc::clone(s), c.clone()))
            })
            .take(MAX_DETAIL_FETCH_COMPETITORS)
            .collect();

        let fetches = targets
            .iter()
            .map(|(_, scraper, competitor)| scraper.fetch_detail_comments(competitor));
        let results = futures::future::join_all(fetches).await;

        for ((i, _, _), comments) in targets.iter().zip(results) {
            competitors[*i].comments = comments;
        }
    }
}

/// Extracts a human-readable message from a panicking task's `JoinError`,
/// falling back to its `Display` output for cancellation/other join errors.
fn panic_message(join_error: tokio::task::JoinError) -> String {
    if join_error.is_panic() {
        describe_panic(join_error.into_panic())
    } else {
        join_error.to_string()
    }
}

/// Extracts a human-readable message from a caught panic payload, for both
/// `JoinError::into_panic()` (a crashed scraper task) and
/// `std::panic::catch_unwind` (a post-processing bug).
fn describe_panic(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked with a non-string payload".to_string()
    }
}
