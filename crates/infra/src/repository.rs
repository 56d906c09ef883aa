//! Domain repositories backed by an [`Adapter`].
//!
//! These translate entities to documents and back, and turn the adapter's
//! `NotFound` into `Ok(None)` so the domain sees found / not found / failed as
//! three distinct outcomes.

use serde::Serialize;
use serde::de::DeserializeOwned;

use ticketengine_core::{Entity, LocationId, OrderId};
use ticketengine_orders::{Location, LocationRepository, Order, OrderRepository, RepositoryError};

use crate::adapter::Adapter;
use crate::document::Document;
use crate::error::StoreError;

/// Collection orders are stored in.
pub const ORDERS_COLLECTION: &str = "orders";

/// Collection locations are stored in.
pub const LOCATIONS_COLLECTION: &str = "locations";

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        RepositoryError::Storage(err.to_string())
    }
}

fn find_entity<A, T>(adapter: &A, collection: &str, id: &str) -> Result<Option<T>, RepositoryError>
where
    A: Adapter,
    T: DeserializeOwned,
{
    match adapter.find(collection, id) {
        Ok(document) => Ok(Some(document.into_entity()?)),
        Err(StoreError::NotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn create_entity<A, T>(adapter: &A, collection: &str, entity: &T) -> Result<(), RepositoryError>
where
    A: Adapter,
    T: Entity + Serialize,
{
    tracing::debug!(collection, key = entity.key(), "storing entity");
    let document = Document::from_entity(entity)?;
    adapter.create(collection, document)?;
    Ok(())
}

/// [`OrderRepository`] storing orders as documents.
#[derive(Debug, Clone)]
pub struct DocumentOrderRepository<A> {
    adapter: A,
}

impl<A> DocumentOrderRepository<A>
where
    A: Adapter,
{
    pub fn new(adapter: A) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }
}

impl<A> OrderRepository for DocumentOrderRepository<A>
where
    A: Adapter,
{
    fn find(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        find_entity(&self.adapter, ORDERS_COLLECTION, id.as_str())
    }

    fn store(&self, order: Order) -> Result<(), RepositoryError> {
        create_entity(&self.adapter, ORDERS_COLLECTION, &order)
    }
}

/// [`LocationRepository`] storing locations as documents.
#[derive(Debug, Clone)]
pub struct DocumentLocationRepository<A> {
    adapter: A,
}

impl<A> DocumentLocationRepository<A>
where
    A: Adapter,
{
    pub fn new(adapter: A) -> Self {
        Self { adapter }
    }
}

impl<A> LocationRepository for DocumentLocationRepository<A>
where
    A: Adapter,
{
    fn create(&self, location: Location) -> Result<(), RepositoryError> {
        create_entity(&self.adapter, LOCATIONS_COLLECTION, &location)
    }

    fn find(&self, id: &LocationId) -> Result<Option<Location>, RepositoryError> {
        find_entity(&self.adapter, LOCATIONS_COLLECTION, id.as_str())
    }
}
