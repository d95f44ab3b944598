use thiserror::Error;

/// Enum with all errors in this crate.
///
/// Every variant is a caller contract violation detected at the API
/// boundary before any traversal begins; a failed call never leaves a tree
/// in a partially-queried or corrupted state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KdIndexError {
    /// A tree cannot be built from zero records.
    #[error("Cannot build a tree from an empty record set.")]
    EmptyInput,

    /// A point's length disagreed with the dimension of the tree, either
    /// between records within one build or between the tree and a query
    /// point.
    #[error("Dimension mismatch: expected {expected} coordinates, got {actual}.")]
    DimensionMismatch {
        /// The dimension the tree or builder was created with.
        expected: usize,
        /// The length of the offending point.
        actual: usize,
    },

    /// A nearest-neighbor query was made with `k == 0`. Note that `k`
    /// larger than the number of records is *not* an error; such a query
    /// simply returns every record.
    #[error("k must be at least 1.")]
    InvalidK,

    /// A range query was made with a negative (or NaN) radius.
    #[error("Radius must be non-negative, got {0}.")]
    InvalidRadius(f64),
}

pub type Result<T> = std::result::Result<T, KdIndexError>;
