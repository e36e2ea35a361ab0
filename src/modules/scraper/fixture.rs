//! An in-process `SourceScraper` that replays a fixed result, used for
//! integration tests and local demos that must not touch the network.

use async_trait::async_trait;

use crate::domain::{CommentRecord, CompetitorRecord, Keyword, ScrapingResult};
use crate::orchestrator::SourceScraper;

pub struct StaticFixtureScraper {
    source_name: String,
    result: ScrapingResult,
    detail_comments: Vec<CommentRecord>,
}

impl StaticFixtureScraper {
    pub fn new(source_name: impl Into<String>, result: ScrapingResult) -> Self {
        Self { source_name: source_name.into(), result, detail_comments: Vec::new() }
    }

    pub fn with_detail_comments(mut self, comments: Vec<CommentRecord>) -> Self {
        self.detail_comments = comments;
        self
    }
}

#[async_trait]
impl SourceScraper for StaticFixtureScraper {
    fn name(&self) -> &str {
        &self.source_name
    }

    fn validate_config(&self) -> bool {
        !self.source_name.is_empty()
    }

    async fn scrape(&self, _keywords: &[Keyword], _idea_text: &str) -> ScrapingResult {
        self.result.clone()
    }

    async fn fetch_detail_comments(&self, _competitor: &CompetitorRecord) -> Vec<CommentRecord> {
        self.detail_comments.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScrapingStatus;

    #[tokio::test]
    async fn replays_fixed_result() {
        let scraper = StaticFixtureScraper::new("FakeA", ScrapingResult::success(vec![], vec![]));
        let result = scraper.scrape(&[], "an idea").await;
        assert_eq!(result.status, ScrapingStatus::Success);
    }
}
