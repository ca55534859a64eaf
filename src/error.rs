//! Error types for the demandiq library.

use thiserror::Error;

/// Result type alias for demand analysis operations.
pub type Result<T> = std::result::Result<T, DemandError>;

/// Errors that can occur while loading data or running the analysis pipeline.
#[derive(Error, Debug)]
pub enum DemandError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between aligned sequences.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Date-index error (ordering, duplicates).
    #[error("date index error: {0}")]
    DateIndex(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Unknown store identifier.
    #[error("unknown store: {0}")]
    UnknownStore(String),

    /// Input file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV structure was unreadable (not a row-level parse problem).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = DemandError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = DemandError::InsufficientData { needed: 14, got: 5 };
        assert_eq!(err.to_string(), "insufficient data: need at least 14, got 5");

        let err = DemandError::InvalidParameter("window must be positive".to_string());
        assert_eq!(err.to_string(), "invalid parameter: window must be positive");

        let err = DemandError::UnknownStore("42".to_string());
        assert_eq!(err.to_string(), "unknown store: 42");

        let err = DemandError::FitRequired;
        assert_eq!(err.to_string(), "model must be fitted before prediction");
    }
}
