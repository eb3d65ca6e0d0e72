//! Error types for algoscope-algorithms.

use thiserror::Error;

/// Result type for algorithm runs.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Input rejected before any algorithm runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The input is not a sequence at all.
    #[error("input must be an array of numbers, got {0}")]
    NotASequence(&'static str),

    /// The sequence has no elements.
    #[error("input array is empty")]
    EmptyInput,

    /// An element cannot be read as a finite number.
    #[error("element {index} is not a number: {value}")]
    NonNumeric { index: usize, value: String },

    /// A searching algorithm was called without a target.
    #[error("a search target is required")]
    MissingTarget,

    /// The search target cannot be read as a finite number.
    #[error("search target is not a number: {0}")]
    NonNumericTarget(String),
}
