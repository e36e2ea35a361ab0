//! Short-TTL cache for detail-fetch comment results
//!
//! Avoids re-fetching and re-analyzing a competitor's discussion thread
//! twice within the same `Scrape` call, analogous to the teacher's
//! `SentimentCache` for Perplexity requests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::domain::CommentRecord;

const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Thread-safe in-memory cache of `FetchDetailComments` results, keyed by
/// the query a scraper issued to produce them.
#[derive(Clone)]
pub struct DetailCommentCache {
    state: Arc<RwLock<HashMap<String, (Vec<CommentRecord>, Instant)>>>,
    ttl: Duration,
}

impl DetailCommentCache {
    /// Create a cache with the default TTL (5 minutes).
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { state: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    /// Return cached comments for `query` if present and not expired.
    pub fn get(&self, query: &str) -> Option<Vec<CommentRecord>> {
        let mut state = self.state.write().ok()?;
        match state.get(query).cloned() {
            Some((comments, inserted_at)) => {
                if inserted_at.elapsed() <= self.ttl {
                    debug!(query, "detail comment cache hit");
                    Some(comments)
                } else {
                    state.remove(query);
                    debug!(query, "detail comment cache miss (expired)");
                    None
                }
            }
            None => {
                debug!(query, "detail comment cache miss");
                None
            }
        }
    }

    /// Store `comments` for `query`.
    pub fn set(&self, query: &str, comments: Vec<CommentRecord>) {
        if let Ok(mut state) = self.state.write() {
            state.insert(query.to_string(), (comments, Instant::now()));
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.state.read().map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for DetailCommentCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_hit_returns_stored_comments() {
        let cache = DetailCommentCache::with_ttl(Duration::from_secs(300));
        cache.set("alpha reviews", vec![CommentRecord::new("great", 1)]);
        let hit = cache.get("alpha reviews").expect("cache hit");
        assert_eq!(hit.len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_miss_for_unknown_query() {
        let cache = DetailCommentCache::with_ttl(Duration::from_secs(300));
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn cache_entry_expires_after_ttl() {
        let cache = DetailCommentCache::with_ttl(Duration::from_millis(50));
        cache.set("short-lived", vec![CommentRecord::new("ok", 1)]);
        assert!(cache.get("short-lived").is_some());
        std::thread::sleep(Duration::from_millis(75));
        assert!(cache.get("short-lived").is_none());
        assert_eq!(cache.len(), 0);
    }
}
