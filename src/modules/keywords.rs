//! Keyword extraction
//!
//! Turns a free-text idea description into a ranked list of search
//! keywords. Pure, synchronous, and deterministic for a given input.

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "for", "with", "that", "this", "to", "of", "in", "on",
    "is", "are", "be", "as", "it", "at", "by", "from", "we", "i", "our", "their", "app", "platform",
    "want", "would", "like", "build", "make", "create",
];

/// Extracts ranked, deduplicated keywords from raw idea text.
pub struct KeywordExtractor;

impl KeywordExtractor {
    /// Derive keywords from `idea_text`, longest/most-frequent words
    /// first. Earlier entries carry higher priority for scrapers that cap
    /// query counts.
    pub fn extract(idea_text: &str) -> Vec<String> {
        let mut counts: Vec<(String, usize)> = Vec::new();

        for raw_word in idea_text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = raw_word.to_lowercase();
            if word.len() < 3 || STOPWORDS.contains(&word.as_str()) {
                continue;
            }

            if let Some(entry) = counts.iter_mut().find(|(w, _)| *w == word) {
                entry.1 += 1;
            } else {
                counts.push((word, 1));
            }
        }

        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.len().cmp(&a.0.len())));
        counts.into_iter().map(|(w, _)| w).collect()
    }
}
