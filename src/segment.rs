use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{QuillError, Result};

pub const DEFAULT_LINE_CAPACITY: usize = 100;

/// Maximum number of characters on one wrapped line of paper.
///
/// Lengths are counted in `char`s, so a line of Hebrew or accented Latin text
/// wraps at the same point as plain ASCII of the same length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct LineCapacity(usize);

impl LineCapacity {
    pub fn new(chars: usize) -> Result<Self> {
        if chars == 0 {
            return Err(QuillError::ZeroCapacity);
        }
        Ok(Self(chars))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for LineCapacity {
    fn default() -> Self {
        Self(DEFAULT_LINE_CAPACITY)
    }
}

impl TryFrom<usize> for LineCapacity {
    type Error = QuillError;

    fn try_from(chars: usize) -> Result<Self> {
        Self::new(chars)
    }
}

impl From<LineCapacity> for usize {
    fn from(capacity: LineCapacity) -> Self {
        capacity.0
    }
}

/// Wrap `text` into fixed-width lines.
///
/// Paragraphs are split on `'\n'`; an empty or whitespace-only paragraph
/// becomes a single empty line. Inside a paragraph words are split on single
/// spaces and packed greedily. A word that alone exceeds the capacity is
/// emitted unmodified on its own line; it is the only way a line can be
/// longer than `capacity`.
///
/// ```
/// use quill::segment::{segment, LineCapacity};
///
/// let capacity = LineCapacity::new(10).unwrap();
/// assert_eq!(segment("hello world foo", capacity), vec!["hello", "world foo"]);
/// assert_eq!(segment("a\n\nb", capacity), vec!["a", "", "b"]);
/// ```
pub fn segment(text: &str, capacity: LineCapacity) -> Vec<String> {
    segment_spans(text, capacity)
        .into_iter()
        .map(|span| text[span].to_string())
        .collect()
}

/// Same wrapping as [`segment`], returning each line as a byte range of
/// `text`. Spaces swallowed at a wrap point and the `'\n'` separators fall
/// between ranges; an empty line is an empty range at its paragraph start.
pub fn segment_spans(text: &str, capacity: LineCapacity) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    if text.is_empty() {
        return spans;
    }

    let mut offset = 0;
    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            spans.push(offset..offset);
        } else {
            wrap_paragraph(paragraph, offset, capacity.get(), &mut spans);
        }
        offset += paragraph.len() + 1;
    }

    spans
}

/// Number of lines `text` occupies at `capacity`.
pub fn line_count(text: &str, capacity: LineCapacity) -> usize {
    segment_spans(text, capacity).len()
}

fn wrap_paragraph(paragraph: &str, base: usize, capacity: usize, spans: &mut Vec<Range<usize>>) {
    // line being filled: byte range within the paragraph and its length in chars
    let mut current: Option<(Range<usize>, usize)> = None;
    let mut word_start = 0;

    for word in paragraph.split(' ') {
        let word_range = word_start..word_start + word.len();
        word_start = word_range.end + 1;
        let word_len = word.chars().count();

        current = match current.take() {
            None if word_len > capacity => {
                spans.push(shift(word_range, base));
                None
            }
            None if word_len == 0 => None,
            None => Some((word_range, word_len)),
            Some((line, line_len)) => {
                let candidate_len = line_len + 1 + word_len;
                if candidate_len > capacity {
                    spans.push(shift(line, base));
                    (word_len > 0).then_some((word_range, word_len))
                } else {
                    Some((line.start..word_range.end, candidate_len))
                }
            }
        };
    }

    if let Some((line, _)) = current {
        spans.push(shift(line, base));
    }
}

fn shift(range: Range<usize>, base: usize) -> Range<usize> {
    range.start + base..range.end + base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(n: usize) -> LineCapacity {
        LineCapacity::new(n).unwrap()
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        assert!(segment("", cap(10)).is_empty());
        assert_eq!(line_count("", cap(10)), 0);
    }

    #[test]
    fn test_greedy_packing() {
        assert_eq!(segment("hello world foo", cap(10)), vec!["hello", "world foo"]);
    }

    #[test]
    fn test_empty_paragraph_is_preserved() {
        assert_eq!(segment("a\n\nb", cap(10)), vec!["a", "", "b"]);
    }

    #[test]
    fn test_only_newlines() {
        assert_eq!(segment("\n", cap(10)), vec!["", ""]);
        assert_eq!(segment("\n\n\n", cap(5)), vec!["", "", "", ""]);
    }

    #[test]
    fn test_whitespace_only_paragraph_is_one_empty_line() {
        assert_eq!(segment("   ", cap(2)), vec![""]);
        assert_eq!(segment("a\n \t \nb", cap(10)), vec!["a", "", "b"]);
    }

    #[test]
    fn test_over_length_word_stands_alone() {
        assert_eq!(
            segment("abcdefghijklmno", cap(10)),
            vec!["abcdefghijklmno"]
        );
        assert_eq!(
            segment("hi abcdefghijklmno yo", cap(10)),
            vec!["hi", "abcdefghijklmno", "yo"]
        );
    }

    #[test]
    fn test_consecutive_spaces_are_kept() {
        assert_eq!(segment("a  b", cap(10)), vec!["a  b"]);
    }

    #[test]
    fn test_exact_fit_stays_on_one_line() {
        assert_eq!(segment("hello worl", cap(10)), vec!["hello worl"]);
        assert_eq!(segment("hello world", cap(11)), vec!["hello world"]);
    }

    #[test]
    fn test_lengths_are_counted_in_chars() {
        // five two-byte chars per word
        let text = "שלוםש עולםע";
        assert_eq!(segment(text, cap(11)), vec![text]);
        assert_eq!(segment(text, cap(10)), vec!["שלוםש", "עולםע"]);
    }

    #[test]
    fn test_trailing_newline_adds_empty_line() {
        assert_eq!(segment("one two\n", cap(20)), vec!["one two", ""]);
    }

    #[test]
    fn test_spans_index_into_text() {
        let text = "hello world foo\n\n  x";
        let spans = segment_spans(text, cap(10));
        assert_eq!(spans, vec![0..5, 6..15, 16..16, 19..20]);
        assert_eq!(&text[spans[1].clone()], "world foo");
    }

    #[test]
    fn test_leading_spaces_are_dropped_trailing_kept() {
        assert_eq!(segment("  a b ", cap(10)), vec!["a b "]);
    }

    #[test]
    fn test_space_at_wrap_point_is_swallowed() {
        assert_eq!(segment("aaaaaaaaaa  b", cap(10)), vec!["aaaaaaaaaa", "b"]);
        assert_eq!(segment("abcdefghijk  x", cap(10)), vec!["abcdefghijk", "x"]);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(LineCapacity::new(0).is_err());
        assert_eq!(LineCapacity::default().get(), DEFAULT_LINE_CAPACITY);
    }

    #[test]
    fn test_capacity_serde_validates() {
        let parsed: LineCapacity = serde_json::from_str("42").unwrap();
        assert_eq!(parsed.get(), 42);
        assert!(serde_json::from_str::<LineCapacity>("0").is_err());
    }
}
