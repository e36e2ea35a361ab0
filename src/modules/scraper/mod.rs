//! Concrete `SourceScraper` implementations and the sentiment analyzer
//! they share.

pub mod comment_cache;
pub mod fixture;
pub mod sentiment;
pub mod web_search;

pub use comment_cache::DetailCommentCache;
pub use fixture::StaticFixtureScraper;
pub use sentiment::{SentimentAnalyzer, SentimentResult};
pub use web_search::WebSearchScraper;
