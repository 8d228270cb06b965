//! Errors raised by the bubble store and its key/value backends.

use std::error::Error as StdError;

use thiserror::Error;

/// Errors raised by the bubble store.
#[derive(Debug, Error)]
pub enum DbError {
    /// The backing key/value engine failed.
    #[error("storage backend: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),

    /// A stored value could not be decoded.
    #[error("could not decode {row} row: {reason}")]
    Decode {
        /// The row the value was read from.
        row: &'static str,
        /// The decoding failure.
        reason: rlp::DecoderError,
    },
}

impl DbError {
    pub(crate) fn backend(err: impl StdError + Send + Sync + 'static) -> Self {
        DbError::Backend(Box::new(err))
    }
}

/// The result type of the bubble store operations.
pub type DbResult<T> = Result<T, DbError>;
