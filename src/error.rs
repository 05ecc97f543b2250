// src/error.rs
// Errors that cross the engine boundary

use crate::store::StoreError;

/// Failures surfaced by the rotator and the dedup fetcher.
///
/// Generation failures never appear here; they are absorbed by the fetcher's
/// fallback content.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("No content available in the pool")]
    EmptyPool,

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
