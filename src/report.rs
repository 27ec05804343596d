use serde::Serialize;

use crate::limits::{LimitStatus, LineThresholds};
use crate::util::{char_count, word_count};

/// Per-line entry of a [`ResultsReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResult {
    /// 1-based position of the line on the paper.
    pub line_number: usize,
    pub word_count: usize,
    pub char_count: usize,
}

/// Snapshot of a finished essay, derived once when the session locks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsReport {
    pub total_lines: usize,
    pub total_words: usize,
    pub per_line: Vec<LineResult>,
    pub status: LimitStatus,
}

impl ResultsReport {
    pub fn from_lines<S: AsRef<str>>(lines: &[S], thresholds: &LineThresholds) -> Self {
        let per_line: Vec<LineResult> = lines
            .iter()
            .enumerate()
            .map(|(idx, line)| LineResult {
                line_number: idx + 1,
                word_count: word_count(line.as_ref()),
                char_count: char_count(line.as_ref()),
            })
            .collect();

        let total_words = per_line.iter().map(|l| l.word_count).sum();

        Self {
            total_lines: per_line.len(),
            total_words,
            status: thresholds.classify(per_line.len()),
            per_line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let lines = ["hello", "world foo", "", "  foo   bar "];
        let report = ResultsReport::from_lines(&lines, &LineThresholds::default());

        assert_eq!(report.total_lines, 4);
        assert_eq!(report.total_words, 5);
        assert_eq!(
            report.per_line[1],
            LineResult {
                line_number: 2,
                word_count: 2,
                char_count: 9
            }
        );
        assert_eq!(report.per_line[2].word_count, 0);
        assert_eq!(report.per_line[3].char_count, 12);
        assert_eq!(report.status, LimitStatus::BelowMinimum { missing: 21 });
    }

    #[test]
    fn test_empty_report() {
        let lines: [&str; 0] = [];
        let report = ResultsReport::from_lines(&lines, &LineThresholds::default());
        assert_eq!(report.total_lines, 0);
        assert_eq!(report.total_words, 0);
        assert!(report.per_line.is_empty());
    }

    #[test]
    fn test_report_json_field_names() {
        let report = ResultsReport::from_lines(&["a b"], &LineThresholds::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalLines"], 1);
        assert_eq!(json["totalWords"], 2);
        assert_eq!(json["perLine"][0]["lineNumber"], 1);
        assert_eq!(json["perLine"][0]["wordCount"], 2);
        assert_eq!(json["perLine"][0]["charCount"], 3);
        assert_eq!(json["status"]["kind"], "belowMinimum");
    }
}
