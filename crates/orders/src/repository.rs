//! Repository ports used by the orders domain.
//!
//! Lookups return `Result<Option<T>, RepositoryError>` so callers can tell the
//! three outcomes apart: `Ok(Some(_))` found, `Ok(None)` not found, `Err(_)`
//! the backing store failed. A failed lookup must never be read as "absent".

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use ticketengine_core::{Entity, LocationId, OrderId};

use crate::location::Location;
use crate::order::Order;

/// Repository operation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The backing store failed (transport, decode, closed connection, ...).
    #[error("storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Persistence port for orders.
pub trait OrderRepository: Send + Sync {
    /// Look up an order by id.
    fn find(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Persist a new order. No uniqueness check is implied.
    fn store(&self, order: Order) -> Result<(), RepositoryError>;
}

/// Persistence port for locations.
pub trait LocationRepository: Send + Sync {
    fn create(&self, location: Location) -> Result<(), RepositoryError>;

    fn find(&self, id: &LocationId) -> Result<Option<Location>, RepositoryError>;
}

impl<R> OrderRepository for Arc<R>
where
    R: OrderRepository + ?Sized,
{
    fn find(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        (**self).find(id)
    }

    fn store(&self, order: Order) -> Result<(), RepositoryError> {
        (**self).store(order)
    }
}

impl<R> LocationRepository for Arc<R>
where
    R: LocationRepository + ?Sized,
{
    fn create(&self, location: Location) -> Result<(), RepositoryError> {
        (**self).create(location)
    }

    fn find(&self, id: &LocationId) -> Result<Option<Location>, RepositoryError> {
        (**self).find(id)
    }
}

/// In-memory order repository for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn len(&self) -> usize {
        self.orders.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn find(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = self
            .orders
            .read()
            .map_err(|_| RepositoryError::storage("lock poisoned"))?;
        Ok(orders.get(id).cloned())
    }

    fn store(&self, order: Order) -> Result<(), RepositoryError> {
        let mut orders = self
            .orders
            .write()
            .map_err(|_| RepositoryError::storage("lock poisoned"))?;
        orders.insert(order.id().clone(), order);
        Ok(())
    }
}

/// In-memory location repository for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryLocationRepository {
    locations: RwLock<HashMap<LocationId, Location>>,
}

impl InMemoryLocationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocationRepository for InMemoryLocationRepository {
    fn create(&self, location: Location) -> Result<(), RepositoryError> {
        let mut locations = self
            .locations
            .write()
            .map_err(|_| RepositoryError::storage("lock poisoned"))?;
        locations.insert(location.id().clone(), location);
        Ok(())
    }

    fn find(&self, id: &LocationId) -> Result<Option<Location>, RepositoryError> {
        let locations = self
            .locations
            .read()
            .map_err(|_| RepositoryError::storage("lock poisoned"))?;
        Ok(locations.get(id).cloned())
    }
}
