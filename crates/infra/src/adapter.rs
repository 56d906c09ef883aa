//! Storage adapter: the seam between domain repositories and the store chain.
//!
//! Repositories see two storage-agnostic operations, `find(collection, id)`
//! and `create(collection, document)`; the connection → database →
//! collection → query walk stays behind this module.

use std::sync::Arc;

use tracing::instrument;

use crate::document::{Criteria, Document};
use crate::error::StoreError;
use crate::store::{Collection, Connection, Database, Query};

/// Storage-agnostic document access used by repositories.
pub trait Adapter: Send + Sync {
    /// First document in `collection` whose `id` equals `id`.
    ///
    /// A missing document is [`StoreError::NotFound`]; every other error is a
    /// failure of the store.
    fn find(&self, collection: &str, id: &str) -> Result<Document, StoreError>;

    /// Append `document` to `collection`. No uniqueness check.
    fn create(&self, collection: &str, document: Document) -> Result<(), StoreError>;
}

impl<A> Adapter for Arc<A>
where
    A: Adapter + ?Sized,
{
    fn find(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        (**self).find(collection, id)
    }

    fn create(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        (**self).create(collection, document)
    }
}

/// [`Adapter`] over any [`Connection`] backend, bound to one logical database.
///
/// Owns the connection for its lifetime. Closing it is the caller's job.
#[derive(Debug)]
pub struct DocumentAdapter<C> {
    connection: C,
    database: String,
}

impl<C> DocumentAdapter<C>
where
    C: Connection,
{
    pub fn new(connection: C, database: impl Into<String>) -> Self {
        Self {
            connection,
            database: database.into(),
        }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn database_name(&self) -> &str {
        &self.database
    }

    pub fn close(&self) -> Result<(), StoreError> {
        self.connection.close()
    }

    fn db(&self) -> C::Database {
        self.connection.database(&self.database)
    }
}

impl<C> Adapter for DocumentAdapter<C>
where
    C: Connection,
{
    #[instrument(level = "debug", skip(self), fields(database = %self.database), err(level = "debug"))]
    fn find(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        self.db()
            .collection(collection)
            .find(Criteria::by_id(id))
            .one()
    }

    #[instrument(level = "debug", skip(self, document), fields(database = %self.database, id = document.id()), err)]
    fn create(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.db().collection(collection).insert(vec![document])
    }
}
