//! Order creation service.
//!
//! Enforces at-most-one order per identifier before storing. The existence
//! check branches on all three lookup outcomes: found rejects, not-found
//! proceeds, and a failed lookup aborts so a transient storage error can never
//! let a duplicate through.

use tracing::instrument;

use ticketengine_core::{DomainError, Entity, LocationId, OrderId};

use crate::order::Order;
use crate::repository::{OrderRepository, RepositoryError};

/// Order creation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderCreationError {
    /// An order with this id already exists.
    #[error("Couldn't create duplicate order {0}.")]
    Duplicate(OrderId),

    /// The request was malformed (e.g. blank identifiers).
    #[error(transparent)]
    Invalid(#[from] DomainError),

    /// The repository failed during lookup or store.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Creates orders through an [`OrderRepository`].
#[derive(Debug, Clone)]
pub struct OrderCreator<R> {
    orders: R,
}

impl<R> OrderCreator<R>
where
    R: OrderRepository,
{
    pub fn new(orders: R) -> Self {
        Self { orders }
    }

    pub fn repository(&self) -> &R {
        &self.orders
    }

    /// Create the order `order_id` at `location_id`.
    ///
    /// Returns the stored order. Fails with [`OrderCreationError::Duplicate`]
    /// if the id is taken; the existing order is left untouched.
    ///
    /// The lookup and the store are separate calls, so at most one order per
    /// id only holds when callers serialize `create` calls for the same id.
    #[instrument(skip(self), err(level = "debug"))]
    pub fn create(&self, order_id: &str, location_id: &str) -> Result<Order, OrderCreationError> {
        let order_id = OrderId::parse(order_id)?;
        let location_id = LocationId::parse(location_id)?;

        match self.orders.find(&order_id) {
            Ok(Some(_)) => {
                tracing::warn!(%order_id, "rejected duplicate order");
                return Err(OrderCreationError::Duplicate(order_id));
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(%order_id, error = %err, "order lookup failed");
                return Err(err.into());
            }
        }

        let order = Order::new(order_id, location_id);
        self.orders.store(order.clone())?;

        tracing::info!(order_id = %order.id(), location_id = %order.location_id(), "order created");
        Ok(order)
    }
}
