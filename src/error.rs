use thiserror::Error;

/// Errors surfaced while loading configuration or touching the filesystem.
///
/// The writing core itself never fails: edits are either accepted or
/// rejected, and segmentation is total over any input.
#[derive(Debug, Error)]
pub enum QuillError {
    #[error("line thresholds must satisfy min < max < hard limit (got {min} / {max} / {hard})")]
    InvalidThresholds { min: usize, max: usize, hard: usize },

    #[error("line capacity must be at least one character")]
    ZeroCapacity,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuillError>;
