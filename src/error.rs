use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the clustering entry points.
///
/// Anything not covered here (out-of-range indices, mismatched fingerprint
/// lengths) is a broken data-model invariant and panics instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No items were supplied.
    #[error("empty input provided")]
    EmptyInput,

    /// Fewer usable items than requested clusters.
    #[error("insufficient data: requested {requested} clusters from {usable} usable items")]
    InsufficientData {
        /// Number of clusters requested.
        requested: usize,
        /// Number of items with a usable fingerprint/vector.
        usable: usize,
    },

    /// A parameter was outside its valid range.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What was wrong with it.
        message: &'static str,
    },
}
