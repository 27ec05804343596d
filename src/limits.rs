use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{QuillError, Result};

pub const DEFAULT_MIN_LINES: usize = 25;
pub const DEFAULT_MAX_LINES: usize = 50;
pub const DEFAULT_HARD_LIMIT: usize = 55;

/// Tiered line-count limits for one essay: the recommended band is
/// `min_lines..=max_lines`, and nothing may be committed past `hard_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineThresholds {
    min_lines: usize,
    max_lines: usize,
    hard_limit: usize,
}

impl LineThresholds {
    pub fn new(min_lines: usize, max_lines: usize, hard_limit: usize) -> Result<Self> {
        if min_lines < max_lines && max_lines < hard_limit {
            Ok(Self {
                min_lines,
                max_lines,
                hard_limit,
            })
        } else {
            Err(QuillError::InvalidThresholds {
                min: min_lines,
                max: max_lines,
                hard: hard_limit,
            })
        }
    }

    pub fn min_lines(&self) -> usize {
        self.min_lines
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    pub fn hard_limit(&self) -> usize {
        self.hard_limit
    }

    /// Whether a text occupying `line_count` lines may be committed.
    pub fn admits(&self, line_count: usize) -> bool {
        line_count <= self.hard_limit
    }

    pub fn classify(&self, line_count: usize) -> LimitStatus {
        LimitStatus::classify(line_count, self)
    }
}

impl Default for LineThresholds {
    fn default() -> Self {
        Self {
            min_lines: DEFAULT_MIN_LINES,
            max_lines: DEFAULT_MAX_LINES,
            hard_limit: DEFAULT_HARD_LIMIT,
        }
    }
}

/// Where a line count sits relative to [`LineThresholds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LimitStatus {
    /// Carries the number of lines still needed to reach the minimum.
    BelowMinimum { missing: usize },
    InRange,
    /// Carries the number of lines past the recommended maximum.
    AboveRecommended { excess: usize },
    /// Only reachable if something bypassed the edit gate.
    AtHardLimit,
}

impl LimitStatus {
    pub fn classify(line_count: usize, thresholds: &LineThresholds) -> Self {
        if line_count < thresholds.min_lines {
            Self::BelowMinimum {
                missing: thresholds.min_lines - line_count,
            }
        } else if line_count <= thresholds.max_lines {
            Self::InRange
        } else if line_count <= thresholds.hard_limit {
            Self::AboveRecommended {
                excess: line_count - thresholds.max_lines,
            }
        } else {
            Self::AtHardLimit
        }
    }

    /// True for statuses the front end should highlight as a warning.
    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::InRange)
    }
}

impl fmt::Display for LimitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BelowMinimum { missing: 1 } => write!(f, "1 line short of the minimum"),
            Self::BelowMinimum { missing } => write!(f, "{missing} lines short of the minimum"),
            Self::InRange => write!(f, "within the recommended range"),
            Self::AboveRecommended { excess: 1 } => {
                write!(f, "1 line above the recommended maximum")
            }
            Self::AboveRecommended { excess } => {
                write!(f, "{excess} lines above the recommended maximum")
            }
            Self::AtHardLimit => write!(f, "hard limit reached"),
        }
    }
}
