//! Composition root for the event service.
//!
//! Wiring is explicit: open a connection, wrap it in a [`DocumentAdapter`],
//! hand that to the repository, hand the repository to the service. Nothing
//! here is process-global.

use std::sync::Arc;

use anyhow::Context;

use ticketengine_core::Entity;
use ticketengine_infra::{
    Backend, Connection, DocumentAdapter, DocumentOrderRepository, InMemoryConnection,
    PostgresConnection, StoreConfig,
};
use ticketengine_orders::{Order, OrderCreator};

/// Open the configured store, create one order, and close the store.
pub fn run(config: &StoreConfig, order_id: &str, location_id: &str) -> anyhow::Result<Order> {
    match config.backend()? {
        Backend::Memory => {
            let connection = InMemoryConnection::open(&config.url)
                .context("opening in-memory store")?;
            create_order(connection, &config.database, order_id, location_id)
        }
        Backend::Postgres => {
            let connection =
                PostgresConnection::open(&config.url).context("connecting to postgres")?;
            create_order(connection, &config.database, order_id, location_id)
        }
    }
}

/// Create one order over `connection`; the connection is closed before
/// returning, whether or not creation succeeded.
pub fn create_order<C>(
    connection: C,
    database: &str,
    order_id: &str,
    location_id: &str,
) -> anyhow::Result<Order>
where
    C: Connection,
{
    let adapter = Arc::new(DocumentAdapter::new(connection, database));
    let creator = OrderCreator::new(DocumentOrderRepository::new(Arc::clone(&adapter)));

    let created = creator.create(order_id, location_id);
    if let Err(err) = adapter.close() {
        tracing::warn!(error = %err, "failed to close store connection");
    }

    let order = created?;
    tracing::info!(order_id = %order.id(), database, "event service created order");
    Ok(order)
}
