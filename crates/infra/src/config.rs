//! Store configuration loading.

use crate::error::StoreError;
use crate::store::{InMemoryConnection, PostgresConnection};

/// Environment variable holding the store address.
pub const STORE_URL_VAR: &str = "STORE_URL";

/// Environment variable holding the logical database name.
pub const STORE_DATABASE_VAR: &str = "STORE_DATABASE";

pub const DEFAULT_STORE_URL: &str = "memory://ticket-engine";
pub const DEFAULT_DATABASE: &str = "ticket_engine";

/// Which backend a store address selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Postgres,
}

/// Where the document store lives and which logical database to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_STORE_URL.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Load from `STORE_URL` / `STORE_DATABASE`, falling back to an in-memory
    /// store when unset.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(STORE_URL_VAR).unwrap_or_else(|| {
            tracing::warn!("{STORE_URL_VAR} not set; using in-memory store {DEFAULT_STORE_URL}");
            DEFAULT_STORE_URL.to_string()
        });
        let database = lookup(STORE_DATABASE_VAR).unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        if url.trim().is_empty() {
            return Err(StoreError::Config(format!("{STORE_URL_VAR} is empty")));
        }
        if database.trim().is_empty() {
            return Err(StoreError::Config(format!("{STORE_DATABASE_VAR} is empty")));
        }

        let config = Self { url, database };
        config.backend()?;
        Ok(config)
    }

    /// Classify the address scheme.
    pub fn backend(&self) -> Result<Backend, StoreError> {
        if self.url.starts_with(InMemoryConnection::SCHEME) {
            Ok(Backend::Memory)
        } else if PostgresConnection::accepts(&self.url) {
            Ok(Backend::Postgres)
        } else {
            Err(StoreError::Config(format!(
                "unsupported {STORE_URL_VAR} scheme (expected memory:// or postgres://)"
            )))
        }
    }
}
