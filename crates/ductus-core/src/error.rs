//! Error types for ductus-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Most stroke operations degrade gracefully (clamping, resampling down)
//! instead of failing; errors are reserved for structural limits the
//! caller must know about.

use thiserror::Error;

/// Ductus core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Too many strokes in a sample
    #[error("stroke limit exceeded: {len} >= {max}")]
    StrokeLimit { len: usize, max: usize },

    /// A sample with no strokes where one is required
    #[error("empty sample: {0}")]
    EmptySample(&'static str),

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Result type alias for ductus-core operations
pub type Result<T> = std::result::Result<T, Error>;
