//! Deduplication of competitor and feedback records aggregated across
//! sources. Deterministic and insertion-stable: the first occurrence of a
//! key wins, later ones are dropped.

use std::collections::HashSet;

use crate::domain::{CompetitorRecord, FeedbackRecord};

/// Minimum length for a competitor name to be kept.
const MIN_NAME_LEN: usize = 2;
/// Minimum length for a feedback text to be kept.
const MIN_TEXT_LEN: usize = 10;
/// Number of leading characters used as the feedback dedup key.
const FEEDBACK_KEY_LEN: usize = 50;

pub struct Deduplicator;

impl Deduplicator {
    /// Dedup competitors by lowercased, trimmed name. Drops names shorter
    /// than two characters.
    pub fn dedup_competitors(records: Vec<CompetitorRecord>) -> Vec<CompetitorRecord> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut result = Vec::new();

        for record in records {
            let key = record.name.trim().to_lowercase();
            if key.len() < MIN_NAME_LEN {
                continue;
            }
            if seen.insert(key) {
                result.push(record);
            }
        }

        result
    }

    /// Dedup feedback by the first 50 lowercased characters of its text.
    /// Drops texts shorter than ten characters.
    pub fn dedup_feedback(records: Vec<FeedbackRecord>) -> Vec<FeedbackRecord> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut result = Vec::new();

        for record in records {
            let trimmed = record.text.trim();
            if trimmed.len() < MIN_TEXT_LEN {
                continue;
            }
            let lowered = trimmed.to_lowercase();
            let key: String = lowered.chars().take(FEEDBACK_KEY_LEN).collect();
            if seen.insert(key) {
                result.push(record);
            }
        }

        result
    }
}
