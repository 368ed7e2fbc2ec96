use thiserror::Error;

/// Error types for the segmentation pipeline
#[derive(Error, Debug)]
pub enum SegmentationError {
    /// Fewer than two eligible numeric features were found
    #[error("Feature shortage: found {found} numeric feature(s), at least 2 are required")]
    FeatureShortage { found: usize },

    /// The requested cluster count needs more records than are available
    #[error("Insufficient data: {n_samples} record(s) cannot be split into {k} clusters (k must be at most n - 1)")]
    InsufficientData { n_samples: usize, k: usize },

    /// The number of clusters k is invalid (must be >= 2)
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// No records or rows were supplied
    #[error("Empty input")]
    EmptyInput,

    /// Row or column counts disagree between inputs
    #[error("Dimension mismatch: {0}")]
    InvalidDimensions(String),

    /// An assignment label lies outside [0, k)
    #[error("Invalid assignment: record {index} has label {label}, expected a label below {k}")]
    InvalidAssignment { index: usize, label: usize, k: usize },

    /// Model has not been fitted yet
    #[error("Model has not been fitted. Call train() or fit() first.")]
    NotFitted,

    /// Configuration could not be parsed or is out of range
    #[error("Config error: {0}")]
    Config(String),
}

impl SegmentationError {
    /// True for the error that terminates an ascending k scan.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, SegmentationError::InsufficientData { .. })
    }
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, SegmentationError>;
