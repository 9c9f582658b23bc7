//! Error types for chart persistence and catalog loading.

use drillflow_core::ChartId;

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, IoError>;

/// Error type for chart file and catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON serialization failed
    #[error("RON serialize error: {0}")]
    RonSerialize(#[from] ron::Error),

    /// RON parsing failed
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// File extension not recognized as a chart format
    #[error("Unsupported chart format: {0}")]
    UnsupportedFormat(String),

    /// Chart file was written by an incompatible version
    #[error("Chart file version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build writes
        expected: String,
        /// Version found in the file
        found: String,
    },

    /// File exceeds the size guard
    #[error("Chart file too large: {size} bytes (limit {limit})")]
    FileTooLarge {
        /// Actual file size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// No saved chart with this id
    #[error("Chart not found: {0}")]
    ChartNotFound(ChartId),
}
