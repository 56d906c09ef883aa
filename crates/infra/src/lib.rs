//! Infrastructure layer: document store backends and the adapter/repositories
//! built on them.

pub mod adapter;
pub mod config;
pub mod document;
pub mod error;
pub mod repository;
pub mod store;


pub use adapter::{Adapter, DocumentAdapter};
pub use config::{Backend, StoreConfig};
pub use document::{Criteria, Document};
pub use error::StoreError;
pub use repository::{DocumentLocationRepository, DocumentOrderRepository};
pub use store::{Collection, Connection, Database, InMemoryConnection, PostgresConnection, Query};
