//! Document store capability chain.
//!
//! `Connection` → `Database` → `Collection` → `Query`. Each level is a narrow
//! trait whose associated type is the next handle, so any level can be swapped
//! for a fake. Handle construction never fails; failures surface on first use
//! (`insert` / `one`) and are passed up unchanged.
//!
//! Backends:
//! - [`memory`]: in-process store for tests/dev (`memory://<name>`)
//! - [`postgres`]: JSONB document table via SQLx (`postgres://...`)

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::document::{Criteria, Document};
use crate::error::StoreError;

pub use memory::InMemoryConnection;
pub use postgres::PostgresConnection;

/// A live link to the store.
///
/// Backends open connections through an inherent `open(address)` constructor.
pub trait Connection: Send + Sync {
    type Database: Database;

    /// Handle to a named logical database. Pure; never fails.
    fn database(&self, name: &str) -> Self::Database;

    /// Release the underlying resources. Closing twice is a no-op.
    fn close(&self) -> Result<(), StoreError>;
}

/// A named logical database.
pub trait Database: Send + Sync {
    type Collection: Collection;

    /// Handle to a named collection. Does not check the collection exists;
    /// collections come into being on first insert.
    fn collection(&self, name: &str) -> Self::Collection;
}

/// A named grouping of documents.
pub trait Collection: Send + Sync {
    type Query: Query;

    /// Deferred lookup; evaluation happens in [`Query::one`].
    fn find(&self, criteria: Criteria) -> Self::Query;

    /// Insert documents in order. Best-effort across the batch: a failure part
    /// way through leaves earlier documents stored.
    fn insert(&self, documents: Vec<Document>) -> Result<(), StoreError>;
}

/// A pending single-result lookup.
pub trait Query: Send {
    /// Decode the first matching document into `T`.
    ///
    /// Fails with [`StoreError::NotFound`] on zero matches,
    /// [`StoreError::Decode`] on shape mismatch, [`StoreError::Read`] on
    /// transport failure.
    fn one<T: DeserializeOwned>(self) -> Result<T, StoreError>;
}

impl<C> Connection for Arc<C>
where
    C: Connection + ?Sized,
{
    type Database = C::Database;

    fn database(&self, name: &str) -> Self::Database {
        (**self).database(name)
    }

    fn close(&self) -> Result<(), StoreError> {
        (**self).close()
    }
}
