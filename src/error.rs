//! Error types for the BRKGA engine.
//!
//! Every violation is a caller error surfaced immediately; nothing here is
//! ever swallowed into a log line.

use thiserror::Error;

use crate::brkga::DecodeError;

/// Error type for all fallible engine operations.
#[derive(Debug, Error)]
pub enum BrkgaError {
    /// Construction parameters violate an engine invariant.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An operation argument is outside its accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A population, rank, slot or gene index is out of range.
    #[error("{what} index {index} out of bounds (len {len})")]
    OutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// The decoder failed on one chromosome of a batch; the batch is discarded.
    #[error("decoder failed on chromosome {index} of the batch: {source}")]
    Decode {
        index: usize,
        #[source]
        source: DecodeError,
    },

    /// The bounded worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl BrkgaError {
    pub(crate) fn out_of_bounds(what: &'static str, index: usize, len: usize) -> Self {
        Self::OutOfBounds { what, index, len }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, BrkgaError>;
