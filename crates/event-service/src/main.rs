use anyhow::{Context, bail};

use ticketengine_core::Entity;
use ticketengine_infra::StoreConfig;

fn main() -> anyhow::Result<()> {
    ticketengine_observability::init();

    let mut args = std::env::args().skip(1);
    let (order_id, location_id) = match (args.next(), args.next()) {
        (Some(order_id), Some(location_id)) => (order_id, location_id),
        _ => bail!("usage: ticketengine-event-service <order-id> <location-id>"),
    };

    let config = StoreConfig::from_env().context("loading store configuration")?;
    tracing::info!(database = %config.database, "starting event service");

    let order = ticketengine_event_service::run(&config, &order_id, &location_id)?;
    println!("created order {} at location {}", order.id(), order.location_id());
    Ok(())
}
