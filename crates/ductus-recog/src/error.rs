//! Error types for ductus-recog

use thiserror::Error;

/// Errors that can occur during recognition operations
#[derive(Debug, Error)]
pub enum RecogError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] ductus_core::Error),

    /// Profile or word list I/O failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Training input had no strokes
    #[error("cannot train an empty sample")]
    EmptyInput,

    /// Training input had no character assigned
    #[error("sample has no character assigned")]
    MissingChar,

    /// A stale handle referred to a sample that no longer exists
    #[error("sample handle is no longer valid")]
    StaleSample,
}

/// Result type for recognition operations
pub type RecogResult<T> = Result<T, RecogError>;
