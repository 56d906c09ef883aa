//! Postgres-backed document store.
//!
//! Every collection of every logical database lives in one `documents` table:
//!
//! ```sql
//! CREATE TABLE documents (
//!     seq        BIGSERIAL PRIMARY KEY,
//!     database   TEXT  NOT NULL,
//!     collection TEXT  NOT NULL,
//!     body       JSONB NOT NULL
//! );
//! ```
//!
//! so databases and collections need no DDL and appear on first insert.
//! Lookups use JSONB containment (`body @> criteria`) and return the earliest
//! inserted match. `Criteria` only carries string values, for which
//! containment is exact equality.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | any, while opening | `Connection` |
//! | `Decode` / `ColumnDecode` | `Decode` |
//! | any other, in `one` | `Read` |
//! | any other, in `insert` | `Write` |
//!
//! ## Blocking
//!
//! The capability traits are synchronous. Each connection owns a
//! current-thread Tokio runtime and drives SQLx on it with `block_on`, so
//! callers must not invoke these handles from inside another async runtime.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tokio::runtime::Runtime;
use tracing::instrument;

use crate::document::{Criteria, Document};
use crate::error::StoreError;

use super::{Collection, Connection, Database, Query};

const SCHEMES: [&str; 2] = ["postgres://", "postgresql://"];

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        seq        BIGSERIAL PRIMARY KEY,
        database   TEXT  NOT NULL,
        collection TEXT  NOT NULL,
        body       JSONB NOT NULL
    )
"#;

const CREATE_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS documents_collection_seq_idx
        ON documents (database, collection, seq)
"#;

#[derive(Debug)]
struct Shared {
    runtime: Runtime,
    pool: PgPool,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Open,
    Read,
    Write,
}

fn map_sqlx_error(operation: Operation, err: sqlx::Error) -> StoreError {
    let msg = match &err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => format!("database error {code}: {}", db_err.message()),
            None => format!("database error: {}", db_err.message()),
        },
        sqlx::Error::PoolClosed => "connection closed".to_string(),
        sqlx::Error::Decode(_) | sqlx::Error::ColumnDecode { .. } => {
            return StoreError::decode(err.to_string());
        }
        other => other.to_string(),
    };

    match operation {
        Operation::Open => StoreError::Connection(msg),
        Operation::Read => StoreError::Read(msg),
        Operation::Write => StoreError::Write(msg),
    }
}

/// Connection to a Postgres document table.
#[derive(Debug, Clone)]
pub struct PostgresConnection {
    shared: Arc<Shared>,
}

impl PostgresConnection {
    /// Connect to `address` (a `postgres://` URL) and ensure the document
    /// table exists.
    #[instrument(skip_all, err)]
    pub fn open(address: &str) -> Result<Self, StoreError> {
        if !Self::accepts(address) {
            return Err(StoreError::connection(
                "unsupported address, expected postgres://... or postgresql://...",
            ));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::connection(format!("failed to start runtime: {e}")))?;

        let pool = runtime
            .block_on(PgPoolOptions::new().connect(address))
            .map_err(|e| map_sqlx_error(Operation::Open, e))?;

        runtime
            .block_on(async {
                sqlx::query(CREATE_TABLE).execute(&pool).await?;
                sqlx::query(CREATE_INDEX).execute(&pool).await
            })
            .map_err(|e| map_sqlx_error(Operation::Open, e))?;

        tracing::info!("connected to postgres document store");
        Ok(Self {
            shared: Arc::new(Shared { runtime, pool }),
        })
    }

    /// Whether `address` names a Postgres server.
    pub fn accepts(address: &str) -> bool {
        SCHEMES.iter().any(|scheme| address.starts_with(scheme))
    }
}

impl Connection for PostgresConnection {
    type Database = PostgresDatabase;

    fn database(&self, name: &str) -> Self::Database {
        PostgresDatabase {
            name: name.to_string(),
            shared: Arc::clone(&self.shared),
        }
    }

    fn close(&self) -> Result<(), StoreError> {
        self.shared.runtime.block_on(self.shared.pool.close());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    name: String,
    shared: Arc<Shared>,
}

impl Database for PostgresDatabase {
    type Collection = PostgresCollection;

    fn collection(&self, name: &str) -> Self::Collection {
        PostgresCollection {
            database: self.name.clone(),
            name: name.to_string(),
            shared: Arc::clone(&self.shared),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresCollection {
    database: String,
    name: String,
    shared: Arc<Shared>,
}

impl Collection for PostgresCollection {
    type Query = PostgresQuery;

    fn find(&self, criteria: Criteria) -> Self::Query {
        PostgresQuery {
            database: self.database.clone(),
            collection: self.name.clone(),
            criteria,
            shared: Arc::clone(&self.shared),
        }
    }

    #[instrument(skip_all, fields(database = %self.database, collection = %self.name, count = documents.len()), err)]
    fn insert(&self, documents: Vec<Document>) -> Result<(), StoreError> {
        let pool = &self.shared.pool;
        self.shared.runtime.block_on(async {
            for document in &documents {
                sqlx::query(
                    "INSERT INTO documents (database, collection, body) VALUES ($1, $2, $3)",
                )
                .bind(&self.database)
                .bind(&self.name)
                .bind(Json(document))
                .execute(pool)
                .await
                .map_err(|e| map_sqlx_error(Operation::Write, e))?;
            }
            Ok::<(), StoreError>(())
        })
    }
}

#[derive(Debug)]
pub struct PostgresQuery {
    database: String,
    collection: String,
    criteria: Criteria,
    shared: Arc<Shared>,
}

impl Query for PostgresQuery {
    #[instrument(skip_all, fields(database = %self.database, collection = %self.collection), err)]
    fn one<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let row = self
            .shared
            .runtime
            .block_on(
                sqlx::query(
                    r#"
                    SELECT body
                    FROM documents
                    WHERE database = $1 AND collection = $2 AND body @> $3
                    ORDER BY seq ASC
                    LIMIT 1
                    "#,
                )
                .bind(&self.database)
                .bind(&self.collection)
                .bind(Json(&self.criteria))
                .fetch_optional(&self.shared.pool),
            )
            .map_err(|e| map_sqlx_error(Operation::Read, e))?
            .ok_or(StoreError::NotFound)?;

        let Json(body) = row
            .try_get::<Json<Value>, _>("body")
            .map_err(|e| map_sqlx_error(Operation::Read, e))?;

        serde_json::from_value(body).map_err(|e| StoreError::decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_postgres_schemes_only() {
        assert!(PostgresConnection::accepts("postgres://localhost/tickets"));
        assert!(PostgresConnection::accepts("postgresql://user@db:5432/tickets"));
        assert!(!PostgresConnection::accepts("memory://local"));
        assert!(!PostgresConnection::accepts("mongodb://localhost"));
    }

    #[test]
    fn open_rejects_foreign_scheme() {
        assert!(matches!(
            PostgresConnection::open("mongodb://localhost:27017"),
            Err(StoreError::Connection(_))
        ));
    }

    #[test]
    fn sqlx_errors_map_by_operation() {
        assert_eq!(
            map_sqlx_error(Operation::Read, sqlx::Error::PoolClosed),
            StoreError::read("connection closed")
        );
        assert_eq!(
            map_sqlx_error(Operation::Write, sqlx::Error::PoolClosed),
            StoreError::write("connection closed")
        );
        assert!(matches!(
            map_sqlx_error(Operation::Open, sqlx::Error::PoolTimedOut),
            StoreError::Connection(_)
        ));
        assert!(matches!(
            map_sqlx_error(Operation::Read, sqlx::Error::RowNotFound),
            StoreError::Read(_)
        ));
    }

    fn database_url() -> String {
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests")
    }

    #[test]
    #[ignore = "requires a running postgres (DATABASE_URL)"]
    fn roundtrip_against_postgres() {
        let conn = PostgresConnection::open(&database_url()).unwrap();
        let collection = conn
            .database("ticket_engine_test")
            .collection(&format!("orders_{}", std::process::id()));

        let missing = collection.find(Criteria::by_id("missing")).one::<Document>();
        assert_eq!(missing, Err(StoreError::NotFound));

        collection
            .insert(vec![
                Document::new("o1").with_field("location_id", "loc-1"),
                Document::new("o1").with_field("location_id", "loc-2"),
            ])
            .unwrap();

        let doc: Document = collection.find(Criteria::by_id("o1")).one().unwrap();
        assert_eq!(doc.get("location_id"), Some(&serde_json::json!("loc-1")));

        collection
            .insert(vec![Document::new("o2").with_field("tags", serde_json::json!(["a", "b"]))])
            .unwrap();
        assert_eq!(
            collection.find(Criteria::new().with("tags", "a")).one::<Document>(),
            Err(StoreError::NotFound)
        );

        conn.close().unwrap();
        conn.close().unwrap();
        assert!(matches!(
            collection.find(Criteria::by_id("o1")).one::<Document>(),
            Err(StoreError::Read(_))
        ));
    }
}
