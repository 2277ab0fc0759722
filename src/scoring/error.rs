use thiserror::Error;

/// Errors returned by the tabulation engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// Rejected input: out-of-range value or a reference to something that
    /// does not exist. Nothing is stored.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Weights or criteria make a segment (or the overall ranking) unusable.
    #[error("not ready for scoring: {0}")]
    Configuration(String),

    /// Nothing has been scored yet for the requested entrant.
    #[error("not yet scored: {0}")]
    InsufficientData(String),
}

impl ScoringError {
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, ScoringError::InsufficientData(_))
    }
}
