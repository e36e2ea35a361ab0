//! Reference `SourceScraper` implementation: issues web searches for a
//! bounded set of queries derived from the idea's keywords, and extracts
//! competitor and feedback records from the result pages.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::config::ScraperConfig;
use crate::domain::{CommentRecord, CompetitorRecord, FeedbackRecord, Keyword, ScrapingResult};
use crate::modules::scraper::comment_cache::DetailCommentCache;
use crate::modules::security::ApiRateLimiter;
use crate::modules::utils::{retry_with_backoff, RetryConfig};
use crate::orchestrator::SourceScraper;

/// Domain suffixes appended to keyword pairs when building search queries,
/// biasing results toward product/company pages over generic articles.
const QUERY_SUFFIXES: &[&str] = &["app", "alternative", "pricing", "reviews"];

const MIN_QUERY_DELAY_MS: u64 = 1000;
const MAX_QUERY_DELAY_MS: u64 = 3000;

const STARTING_CONFIDENCE: f64 = 0.85;
const MAX_REVIEWS_PER_ENTITY: usize = 10;
const MAX_HITS_PER_QUERY: usize = 10;

pub struct WebSearchScraper {
    source_name: String,
    search_base_url: String,
    client: reqwest::Client,
    config: ScraperConfig,
    rate_limiter: ApiRateLimiter,
    detail_cache: DetailCommentCache,
}

impl WebSearchScraper {
    pub fn new(source_name: impl Into<String>, search_base_url: impl Into<String>, config: ScraperConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_default();

        Self {
            source_name: source_name.into(),
            search_base_url: search_base_url.into(),
            client,
            config,
            rate_limiter: ApiRateLimiter::for_default_scraper(),
            detail_cache: DetailCommentCache::new(),
        }
    }

    /// Combines the top keywords in pairs, appends domain suffixes, then
    /// dedups while preserving order and caps to `max_queries`.
    fn build_queries(&self, keywords: &[Keyword], idea_text: &str) -> Vec<String> {
        let mut queries = Vec::new();
        let mut seen = std::collections::HashSet::new();

        let top: Vec<&Keyword> = keywords.iter().take(6).collect();

        if top.is_empty() {
            let fallback = idea_text.split_whitespace().take(4).collect::<Vec<_>>().join(" ");
            if !fallback.is_empty() {
                queries.push(fallback);
            }
            return queries;
        }

        for pair in top.windows(2) {
            let base = format!("{} {}", pair[0], pair[1]);
            if seen.insert(base.clone()) {
                queries.push(base);
            }
        }

        if top.len() == 1 {
            queries.push(top[0].to_string());
        }

        for kw in &top {
            for suffix in QUERY_SUFFIXES {
                let query = format!("{} {}", kw, suffix);
                if seen.insert(query.clone()) {
                    queries.push(query);
                }
            }
        }

        queries.truncate(self.config.max_queries_per_source.max(1));
        queries
    }

    async fn jittered_delay(&self) {
        let millis = rand::thread_rng().gen_range(MIN_QUERY_DELAY_MS..=MAX_QUERY_DELAY_MS);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    /// Runs one query, retrying transient failures (network errors, non-2xx
    /// responses) with exponential backoff per `ScraperConfig`'s retry
    /// settings before counting it toward the caller's `failed_queries`.
    async fn run_query(&self, query: &str) -> Result<(Vec<CompetitorRecord>, Vec<FeedbackRecord>), String> {
        let retry_config = RetryConfig::new(self.config.max_retries, self.config.base_backoff_ms);

        retry_with_backoff(
            retry_config,
            || self.run_query_once(query),
            |_| true,
        )
        .await
    }

    async fn run_query_once(&self, query: &str) -> Result<(Vec<CompetitorRecord>, Vec<FeedbackRecord>), String> {
        self.rate_limiter.wait_for_rate_limit().await;

        let response = match self.client.get(&self.search_base_url).query(&[("q", query)]).send().await {
            Ok(response) => response,
            Err(e) => {
                self.rate_limiter.record_failure().await;
                return Err(e.to_string());
            }
        };

        if !response.status().is_success() {
            self.rate_limiter.record_failure().await;
            return Err(format!("HTTP {}", response.status()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                self.rate_limiter.record_failure().await;
                return Err(e.to_string());
            }
        };
        self.rate_limiter.record_success().await;

        let (competitors, feedback) = parse_search_results(&body, &self.source_name, &self.search_base_url);
        debug!(
            source = %self.source_name,
            query,
            competitors = competitors.len(),
            feedback = feedback.len(),
            "query completed"
        );
        Ok((competitors, feedback))
    }
}

#[async_trait]
impl SourceScraper for WebSearchScraper {
    fn name(&self) -> &str {
        &self.source_name
    }

    fn validate_config(&self) -> bool {
        !self.source_name.is_empty()
            && url::Url::parse(&self.search_base_url).is_ok()
            && self.config.max_queries_per_source > 0
    }

    async fn scrape(&self, keywords: &[Keyword], idea_text: &str) -> ScrapingResult {
        let queries = self.build_queries(keywords, idea_text);
        if queries.is_empty() {
            return ScrapingResult::failed("no usable keywords to build a query from");
        }

        let mut competitors = Vec::new();
        let mut feedback = Vec::new();
        let mut succeeded = 0usize;
        let mut failed_queries = 0usize;
        let mut last_error = String::new();

        for (i, query) in queries.iter().enumerate() {
            if i > 0 {
                self.jittered_delay().await;
            }

            match self.run_query(query).await {
                Ok((mut found_competitors, mut found_feedback)) => {
                    succeeded += 1;
                    competitors.append(&mut found_competitors);
                    feedback.append(&mut found_feedback);
                }
                Err(err) => {
                    warn!(source = %self.source_name, query, error = %err, "query failed");
                    failed_queries += 1;
                    last_error = err;
                }
            }
        }

        let mut metadata = std::collections::HashMap::new();
        metadata.insert("failed_queries".to_string(), serde_json::json!(failed_queries));

        if succeeded == 0 {
            return ScrapingResult {
                status: crate::domain::ScrapingStatus::Failed,
                competitors: Vec::new(),
                feedback: Vec::new(),
                error_message: Some(if last_error.is_empty() {
                    "all queries failed".to_string()
                } else {
                    last_error
                }),
                metadata,
            };
        }

        feedback.truncate(MAX_REVIEWS_PER_ENTITY * queries.len());

        if failed_queries > 0 {
            ScrapingResult {
                status: crate::domain::ScrapingStatus::PartialSuccess,
                competitors,
                feedback,
                error_message: Some(format!("{} of {} queries failed", failed_queries, queries.len())),
                metadata,
            }
        } else {
            ScrapingResult {
                status: crate::domain::ScrapingStatus::Success,
                competitors,
                feedback,
                error_message: None,
                metadata,
            }
        }
    }

    async fn close(&self) {
        debug!(source = %self.source_name, "scraper closed");
    }

    async fn fetch_detail_comments(&self, competitor: &CompetitorRecord) -> Vec<CommentRecord> {
        let query = format!("{} reviews", competitor.name);

        if let Some(cached) = self.detail_cache.get(&query) {
            return cached;
        }

        self.rate_limiter.wait_for_rate_limit().await;

        let Ok(response) = self.client.get(&self.search_base_url).query(&[("q", &query)]).send().await else {
            return Vec::new();
        };

        let Ok(body) = response.text().await else {
            return Vec::new();
        };

        let (_, feedback) = parse_search_results(&body, &self.source_name, &self.search_base_url);
        let comments: Vec<CommentRecord> = feedback
            .into_iter()
            .enumerate()
            .take(MAX_REVIEWS_PER_ENTITY)
            .map(|(i, f)| CommentRecord::new(f.text, i + 1))
            .collect();

        self.detail_cache.set(&query, comments.clone());
        comments
    }
}

/// Parses a search results page into competitor and feedback records.
/// Expects a generic result-list markup: each hit is a `.result` element
/// with a `.result-title` link and a `.result-snippet` paragraph — the
/// shape common to lightweight search front-ends and many SaaS directory
/// listing pages.
fn parse_search_results(html: &str, source: &str, source_url: &str) -> (Vec<CompetitorRecord>, Vec<FeedbackRecord>) {
    let document = Html::parse_document(html);
    let result_selector = match Selector::parse(".result") {
        Ok(sel) => sel,
        Err(_) => return (Vec::new(), Vec::new()),
    };
    let title_selector = Selector::parse(".result-title").ok();
    let snippet_selector = Selector::parse(".result-snippet").ok();

    let mut competitors = Vec::new();
    let mut feedback = Vec::new();

    for (i, hit) in document.select(&result_selector).enumerate().take(MAX_HITS_PER_QUERY) {
        let title = title_selector
            .as_ref()
            .and_then(|sel| hit.select(sel).next())
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();
        let snippet = snippet_selector
            .as_ref()
            .and_then(|sel| hit.select(sel).next())
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();
        let link = title_selector
            .as_ref()
            .and_then(|sel| hit.select(sel).next())
            .and_then(|el| el.value().attr("href"))
            .unwrap_or(source_url)
            .to_string();

        if title.trim().is_empty() {
            continue;
        }

        // Every hit is a distinct entity (spec: competitors extracted
        // entity-level from search hits), with confidence decaying a
        // touch further down the results page.
        let mut confidence = STARTING_CONFIDENCE - (i as f64 * 0.02);
        if snippet.trim().is_empty() {
            confidence -= 0.1;
        }
        let mut record = CompetitorRecord::new(title.trim(), source, &link, confidence.clamp(0.0, 1.0));
        if !snippet.trim().is_empty() {
            record.description = Some(snippet.trim().to_string());
            record.website = Some(link.clone());
        }
        record.pricing_model = infer_pricing_model(&snippet);
        competitors.push(record);

        if !snippet.trim().is_empty() {
            feedback.push(FeedbackRecord::new(snippet.trim(), source, link));
        }
    }

    (competitors, feedback)
}

/// Pricing model inference from a snippet of text.
///
/// `Free` when a free flag is present with no in-app purchase mention,
/// `Freemium` when both are present, `Paid (<display>)` when a price is
/// found, `Paid` as the fallback when pricing language is present at all.
fn infer_pricing_model(snippet: &str) -> Option<String> {
    let lower = snippet.to_lowercase();
    let has_free = lower.contains("free");
    let has_iap = lower.contains("in-app purchase") || lower.contains("in app purchase");

    if let Some(price) = extract_price_display(&lower) {
        return Some(format!("Paid ({})", price));
    }

    if has_free && has_iap {
        return Some("Freemium".to_string());
    }
    if has_free {
        return Some("Free".to_string());
    }
    if lower.contains("price") || lower.contains("subscription") || lower.contains("paid") {
        return Some("Paid".to_string());
    }

    None
}

fn extract_price_display(lower: &str) -> Option<String> {
    let dollar_index = lower.find('$')?;
    let rest = &lower[dollar_index..];
    let display: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '$' || *c == '/' || c.is_alphabetic())
        .collect();
    if display.len() > 1 {
        Some(display)
    } else {
        None
    }
}
