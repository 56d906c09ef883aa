//! In-memory document store.
//!
//! Intended for tests/dev. Documents are kept as raw JSON per
//! `(database, collection)` in insertion order; lookups scan linearly and
//! return the first match.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::document::{Criteria, Document};
use crate::error::StoreError;

use super::{Collection, Connection, Database, Query};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CollectionKey {
    database: String,
    collection: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: RwLock<HashMap<CollectionKey, Vec<Value>>>,
    closed: AtomicBool,
}

impl MemoryState {
    fn ensure_open(&self, on_closed: fn(String) -> StoreError) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(on_closed("connection closed".to_string()));
        }
        Ok(())
    }
}

/// Connection to an in-process store. Clones share the same documents.
#[derive(Debug, Clone)]
pub struct InMemoryConnection {
    name: String,
    state: Arc<MemoryState>,
}

impl InMemoryConnection {
    pub const SCHEME: &'static str = "memory://";

    /// Open a fresh, empty store at `memory://<name>`.
    pub fn open(address: &str) -> Result<Self, StoreError> {
        let name = address.strip_prefix(Self::SCHEME).ok_or_else(|| {
            StoreError::connection(format!("unsupported address '{address}', expected memory://<name>"))
        })?;
        if name.is_empty() {
            return Err(StoreError::connection("memory address is missing a store name"));
        }

        tracing::debug!(store = name, "opened in-memory store");
        Ok(Self {
            name: name.to_string(),
            state: Arc::new(MemoryState::default()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::Acquire)
    }
}

impl Connection for InMemoryConnection {
    type Database = InMemoryDatabase;

    fn database(&self, name: &str) -> Self::Database {
        InMemoryDatabase {
            name: name.to_string(),
            state: Arc::clone(&self.state),
        }
    }

    fn close(&self) -> Result<(), StoreError> {
        if !self.state.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(store = %self.name, "closed in-memory store");
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryDatabase {
    name: String,
    state: Arc<MemoryState>,
}

impl Database for InMemoryDatabase {
    type Collection = InMemoryCollection;

    fn collection(&self, name: &str) -> Self::Collection {
        InMemoryCollection {
            key: CollectionKey {
                database: self.name.clone(),
                collection: name.to_string(),
            },
            state: Arc::clone(&self.state),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryCollection {
    key: CollectionKey,
    state: Arc<MemoryState>,
}

impl InMemoryCollection {
    /// Number of documents currently stored in this collection.
    pub fn count(&self) -> Result<usize, StoreError> {
        self.state.ensure_open(StoreError::Read)?;
        let collections = self
            .state
            .collections
            .read()
            .map_err(|_| StoreError::read("lock poisoned"))?;
        Ok(collections.get(&self.key).map(Vec::len).unwrap_or(0))
    }
}

impl Collection for InMemoryCollection {
    type Query = InMemoryQuery;

    fn find(&self, criteria: Criteria) -> Self::Query {
        InMemoryQuery {
            key: self.key.clone(),
            criteria,
            state: Arc::clone(&self.state),
        }
    }

    fn insert(&self, documents: Vec<Document>) -> Result<(), StoreError> {
        self.state.ensure_open(StoreError::Write)?;

        let mut collections = self
            .state
            .collections
            .write()
            .map_err(|_| StoreError::write("lock poisoned"))?;

        collections
            .entry(self.key.clone())
            .or_default()
            .extend(documents.into_iter().map(Document::into_value));
        Ok(())
    }
}

#[derive(Debug)]
pub struct InMemoryQuery {
    key: CollectionKey,
    criteria: Criteria,
    state: Arc<MemoryState>,
}

impl Query for InMemoryQuery {
    fn one<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        self.state.ensure_open(StoreError::Read)?;

        let found = {
            let collections = self
                .state
                .collections
                .read()
                .map_err(|_| StoreError::read("lock poisoned"))?;
            collections
                .get(&self.key)
                .and_then(|docs| docs.iter().find(|doc| self.criteria.matches(doc)))
                .cloned()
        };

        let value = found.ok_or(StoreError::NotFound)?;
        serde_json::from_value(value).map_err(|e| StoreError::decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn orders(conn: &InMemoryConnection) -> InMemoryCollection {
        conn.database("ticket_engine").collection("orders")
    }

    #[test]
    fn open_requires_memory_scheme() {
        assert!(InMemoryConnection::open("memory://test").is_ok());
        assert!(matches!(
            InMemoryConnection::open("postgres://localhost/db"),
            Err(StoreError::Connection(_))
        ));
        assert!(matches!(
            InMemoryConnection::open("memory://"),
            Err(StoreError::Connection(_))
        ));
    }

    #[test]
    fn insert_then_find_one() {
        let conn = InMemoryConnection::open("memory://test").unwrap();
        let c = orders(&conn);
        c.insert(vec![Document::new("o1").with_field("location_id", "loc-1")])
            .unwrap();

        let doc: Document = c.find(Criteria::by_id("o1")).one().unwrap();
        assert_eq!(doc.id(), "o1");
        assert_eq!(doc.get("location_id"), Some(&json!("loc-1")));
    }

    #[test]
    fn find_on_missing_collection_is_not_found() {
        let conn = InMemoryConnection::open("memory://test").unwrap();
        let result = orders(&conn).find(Criteria::by_id("missing")).one::<Document>();
        assert_eq!(result, Err(StoreError::NotFound));
    }

    #[test]
    fn first_match_wins_and_duplicates_are_allowed() {
        let conn = InMemoryConnection::open("memory://test").unwrap();
        let c = orders(&conn);
        c.insert(vec![
            Document::new("o1").with_field("n", 1),
            Document::new("o1").with_field("n", 2),
        ])
        .unwrap();

        assert_eq!(c.count().unwrap(), 2);
        let doc: Document = c.find(Criteria::by_id("o1")).one().unwrap();
        assert_eq!(doc.get("n"), Some(&json!(1)));
    }

    #[test]
    fn collections_and_databases_are_isolated() {
        let conn = InMemoryConnection::open("memory://test").unwrap();
        orders(&conn).insert(vec![Document::new("o1")]).unwrap();

        let other_collection = conn.database("ticket_engine").collection("locations");
        let other_database = conn.database("archive").collection("orders");
        assert!(other_collection.find(Criteria::by_id("o1")).one::<Document>().unwrap_err().is_not_found());
        assert!(other_database.find(Criteria::by_id("o1")).one::<Document>().unwrap_err().is_not_found());
    }

    #[test]
    fn decode_mismatch_is_reported() {
        #[derive(Debug, serde::Deserialize)]
        struct Seat {
            #[allow(dead_code)]
            row: u32,
        }

        let conn = InMemoryConnection::open("memory://test").unwrap();
        let c = orders(&conn);
        c.insert(vec![Document::new("o1").with_field("row", "A")]).unwrap();

        assert!(matches!(
            c.find(Criteria::by_id("o1")).one::<Seat>(),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn closed_connection_fails_reads_and_writes() {
        let conn = InMemoryConnection::open("memory://test").unwrap();
        let c = orders(&conn);
        c.insert(vec![Document::new("o1")]).unwrap();

        conn.close().unwrap();
        conn.close().unwrap();
        assert!(conn.is_closed());

        assert!(matches!(
            c.find(Criteria::by_id("o1")).one::<Document>(),
            Err(StoreError::Read(_))
        ));
        assert!(matches!(c.insert(vec![Document::new("o2")]), Err(StoreError::Write(_))));
    }

    #[test]
    fn clones_share_state() {
        let conn = InMemoryConnection::open("memory://test").unwrap();
        let clone = conn.clone();
        orders(&conn).insert(vec![Document::new("o1")]).unwrap();
        assert_eq!(orders(&clone).count().unwrap(), 1);
    }

    #[test]
    fn concurrent_inserts_are_all_kept() {
        let conn = InMemoryConnection::open("memory://test").unwrap();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let c = orders(&conn);
                std::thread::spawn(move || c.insert(vec![Document::new(format!("o{i}"))]))
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }
        assert_eq!(orders(&conn).count().unwrap(), 8);
    }
}
