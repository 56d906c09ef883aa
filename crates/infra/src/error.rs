//! Storage error taxonomy.

use thiserror::Error;

/// Error raised anywhere along the connection → database → collection → query
/// chain, and by the [`Adapter`](crate::adapter::Adapter) built on it.
///
/// Handles pass these through unchanged. Callers are expected to branch on
/// [`StoreError::NotFound`] (an ordinary outcome) separately from the
/// transport and decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached, or the address was malformed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Transport-level failure while reading.
    #[error("storage read failed: {0}")]
    Read(String),

    /// Transport failure, constraint violation or malformed document on write.
    #[error("storage write failed: {0}")]
    Write(String),

    /// Zero documents matched the criteria.
    #[error("document not found")]
    NotFound,

    /// A matched document could not be materialized into the target shape.
    #[error("document decode failed: {0}")]
    Decode(String),

    /// Store configuration was missing or invalid.
    #[error("invalid store configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
