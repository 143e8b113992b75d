//! Error types for lattix-freebase.

use thiserror::Error;

/// Error type for node record operations.
///
/// Literal classification and normalization never fail; these errors only
/// come from reading serialized records back or writing them out.
#[derive(Error, Debug)]
pub enum Error {
    /// A serialized fact line is not `subject\tpredicate\tvalue\t.`.
    #[error("Invalid fact line: {0}")]
    InvalidFact(String),

    /// A serialized node record mixes subjects.
    #[error("Subject mismatch: expected {expected}, found {found}")]
    SubjectMismatch {
        /// Subject of the first line.
        expected: String,
        /// Subject of the offending line.
        found: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for node record operations.
pub type Result<T> = std::result::Result<T, Error>;
