//! Core error types.

use thiserror::Error;

/// Core storage and query errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Key decoding error.
    #[error("invalid key format")]
    InvalidKey,

    /// Query shape the executor cannot run.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid data format.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
