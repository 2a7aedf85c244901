use serde::{Deserialize, Serialize};

use crate::error::{KatariError, Result};

/// Maximum segment length (characters) accepted by the speech engine
pub const MAX_SEGMENT_CHARS: usize = 500;

/// One sentence-level unit of narration text, 0-indexed in story order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    pub index: usize,
    pub text: String,
}

impl TextSegment {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Split a story into trimmed, non-empty sentence segments.
///
/// Sentences are delimited by `.`; empty pieces (consecutive periods,
/// trailing whitespace) are discarded. Indices follow story order.
pub fn split_story(story: &str) -> Vec<TextSegment> {
    story
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(index, text)| TextSegment::new(index, text))
        .collect()
}

/// Normalize a raw text segment for synthesis.
///
/// Trims whitespace, guarantees a sentence-ending period, then truncates
/// segments longer than `max_chars` to `max_chars - 3` characters plus an
/// ellipsis. The period goes first so the result never exceeds `max_chars`.
/// Returns `EmptyInput` when nothing remains after trimming.
pub fn normalize(raw: &str, max_chars: usize) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(KatariError::EmptyInput);
    }

    let mut text = trimmed.to_string();
    if !text.ends_with('.') {
        text.push('.');
    }

    if text.chars().count() > max_chars {
        let truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        text = format!("{}...", truncated);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_punctuates() {
        assert_eq!(
            normalize("  hello world  ", MAX_SEGMENT_CHARS).unwrap(),
            "hello world."
        );
        assert_eq!(
            normalize("already done.", MAX_SEGMENT_CHARS).unwrap(),
            "already done."
        );
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(matches!(
            normalize("   ", MAX_SEGMENT_CHARS),
            Err(KatariError::EmptyInput)
        ));
        assert!(matches!(
            normalize("", MAX_SEGMENT_CHARS),
            Err(KatariError::EmptyInput)
        ));
    }

    #[test]
    fn test_normalize_truncates_long_segments() {
        let long = "a".repeat(600);
        let result = normalize(&long, MAX_SEGMENT_CHARS).unwrap();
        assert_eq!(result.chars().count(), 500);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_normalize_never_exceeds_limit_at_the_boundary() {
        // Exactly at the limit without a trailing period: appending one must
        // not push the result over.
        let boundary = "a".repeat(MAX_SEGMENT_CHARS);
        let result = normalize(&boundary, MAX_SEGMENT_CHARS).unwrap();
        assert_eq!(result.chars().count(), MAX_SEGMENT_CHARS);
        assert!(result.ends_with("..."));

        let punctuated = format!("{}.", "a".repeat(MAX_SEGMENT_CHARS - 1));
        assert_eq!(
            normalize(&punctuated, MAX_SEGMENT_CHARS).unwrap(),
            punctuated
        );
    }

    #[test]
    fn test_normalize_honors_configured_limit() {
        let result = normalize(&"a".repeat(20), 10).unwrap();
        assert_eq!(result.chars().count(), 10);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["hello", "  spaced out  ", "punctuated.", &"x".repeat(700)] {
            let once = normalize(input, MAX_SEGMENT_CHARS).unwrap();
            let twice = normalize(&once, MAX_SEGMENT_CHARS).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_split_story_drops_empty_sentences() {
        let segments = split_story("Rome fell in 476. The empire ended..  ");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], TextSegment::new(0, "Rome fell in 476"));
        assert_eq!(segments[1], TextSegment::new(1, "The empire ended"));
    }

    #[test]
    fn test_split_story_empty_input() {
        assert!(split_story("").is_empty());
        assert!(split_story("...").is_empty());
    }
}
