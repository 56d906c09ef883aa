//! Orders domain module.
//!
//! This crate contains the order/location entities, the repository ports the
//! domain speaks to, and the order creation service. It performs no IO itself;
//! storage is reached only through the repository traits.

pub mod creator;
pub mod location;
pub mod order;
pub mod repository;

pub use creator::{OrderCreationError, OrderCreator};
pub use location::Location;
pub use order::Order;
pub use repository::{
    InMemoryLocationRepository, InMemoryOrderRepository, LocationRepository, OrderRepository,
    RepositoryError,
};
