//! Pure text-cleaning transforms applied to every scraped string field.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{CommentRecord, CompetitorRecord, FeedbackRecord};

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static MULTI_NEWLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Unicode codepoints commonly found in scraped HTML, mapped to their
/// ASCII-printable equivalents.
const UNICODE_TABLE: &[(char, &str)] = &[
    ('\u{2018}', "'"),  // left single quote
    ('\u{2019}', "'"),  // right single quote
    ('\u{201C}', "\""), // left double quote
    ('\u{201D}', "\""), // right double quote
    ('\u{2013}', "-"),  // en dash
    ('\u{2014}', "-"),  // em dash
    ('\u{2026}', "..."), // horizontal ellipsis
    ('\u{00AE}', ""),    // registered trademark
    ('\u{2122}', ""),    // trademark
    ('\u{00A9}', ""),    // copyright
    ('\u{2022}', "-"),   // bullet
    ('\u{00A0}', " "),   // non-breaking space
];

/// Applies the full clean pipeline to a single string: HTML strip, escape
/// sequence conversion, Unicode canonicalization, whitespace normalize,
/// trim.
pub fn clean_text(input: &str) -> String {
    let stripped = HTML_TAG_RE.replace_all(input, "");

    let unescaped = stripped
        .replace("\\r\\n", "\n")
        .replace("\\n", "\n")
        .replace("\\t", " ")
        .replace('\r', "\n");

    let mut canonicalized = unescaped;
    for (codepoint, replacement) in UNICODE_TABLE {
        canonicalized = canonicalized.replace(*codepoint, replacement);
    }

    let single_spaced = MULTI_SPACE_RE.replace_all(&canonicalized, " ");
    let collapsed_newlines = MULTI_NEWLINE_RE.replace_all(&single_spaced, "\n\n");

    collapsed_newlines.trim().to_string()
}

fn clean_optional(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|s| clean_text(s))
}

/// Cleans every string field on a list of competitor records, including
/// nested comments. Non-string fields (scores, counts, dates) are
/// untouched; `None` stays `None`.
pub fn clean_competitors(records: Vec<CompetitorRecord>) -> Vec<CompetitorRecord> {
    records
        .into_iter()
        .map(|mut record| {
            record.name = clean_text(&record.name);
            record.description = clean_optional(&record.description);
            record.website = clean_optional(&record.website);
            record.estimated_users = clean_optional(&record.estimated_users);
            record.estimated_revenue = clean_optional(&record.estimated_revenue);
            record.pricing_model = clean_optional(&record.pricing_model);
            record.source = clean_text(&record.source);
            record.source_url = clean_text(&record.source_url);
            record.launch_date = clean_optional(&record.launch_date);
            record.founder_ceo = clean_optional(&record.founder_ceo);
            record.comments = clean_comments(record.comments);
            record
        })
        .collect()
}

/// Cleans every string field on a list of comment records.
pub fn clean_comments(comments: Vec<CommentRecord>) -> Vec<CommentRecord> {
    comments
        .into_iter()
        .map(|mut comment| {
            comment.text = clean_text(&comment.text);
            comment.author = clean_optional(&comment.author);
            comment
        })
        .collect()
}

/// Cleans every string field on a list of feedback records.
pub fn clean_feedback(records: Vec<FeedbackRecord>) -> Vec<FeedbackRecord> {
    records
        .into_iter()
        .map(|mut record| {
            record.text = clean_text(&record.text);
            record.source = clean_text(&record.source);
            record.source_url = clean_text(&record.source_url);
            for value in record.author_info.values_mut() {
                *value = clean_text(value);
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_html_tags() {
        assert_eq!(clean_text("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn converts_escape_sequences() {
        assert_eq!(clean_text("line one\\nline two"), "line one\nline two");
    }

    #[test]
    fn canonicalizes_smart_quotes() {
        assert_eq!(clean_text("it\u{2019}s great"), "it's great");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_text("too    many   spaces"), "too many spaces");
    }

    #[test]
    fn collapses_excess_newlines() {
        assert_eq!(clean_text("para one\n\n\n\npara two"), "para one\n\npara two");
    }

    #[test]
    fn trims_leading_and_trailing_whitespace() {
        assert_eq!(clean_text("   padded   "), "padded");
    }

    #[test]
    fn preserves_none_fields() {
        let record = CompetitorRecord::new("Acme", "FakeA", "u1", 0.8);
        let cleaned = clean_competitors(vec![record]).remove(0);
        assert!(cleaned.description.is_none());
        assert!(cleaned.website.is_none());
    }
}
