//! `SQLite` storage layer for `boostme`.
//!
//! This module provides the persistence layer using `SQLite` with:
//! - An `r2d2` connection pool built from a DSN
//! - A generic parameterized query executor
//! - Domain accessors for challenges and clients
//!
//! # Submodules
//!
//! - [`pool`] - DSN parsing and pool construction
//! - [`executor`] - Statement execution, ordering and paging
//! - [`schema`] - Database schema definitions
//! - [`challenges`] - Challenge catalog accessor
//! - [`clients`] - Client directory accessor
//! - [`seed`] - Built-in catalog

pub mod challenges;
pub mod clients;
pub mod executor;
pub mod pool;
pub mod schema;
pub mod seed;

pub use challenges::ChallengeRepository;
pub use clients::ClientRepository;
pub use executor::{
    Params, QueryExecutor, QueryModifiers, QueryOutcome, RowSet, SortDirection, StatementKind,
    WriteSummary,
};
pub use pool::{DatabaseUrl, DbPool, PoolOptions, create_pool};

use crate::error::Result;
use schema::apply_schema;

/// An opened store: one pool, schema applied, accessors on demand.
#[derive(Debug, Clone)]
pub struct Storage {
    executor: QueryExecutor,
    fresh: bool,
}

impl Storage {
    /// Open the store named by `url` and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be built or schema application fails.
    pub fn open(url: &DatabaseUrl, options: &PoolOptions) -> Result<Self> {
        let executor = QueryExecutor::new(create_pool(url, options)?);
        let fresh = apply_schema(&executor)?;
        Ok(Self { executor, fresh })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        Self::open(&DatabaseUrl::Memory, &PoolOptions::default())
    }

    /// True when this open created the schema.
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        self.fresh
    }

    #[must_use]
    pub const fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    #[must_use]
    pub fn challenges(&self) -> ChallengeRepository {
        ChallengeRepository::new(self.executor.clone())
    }

    #[must_use]
    pub fn clients(&self) -> ClientRepository {
        ClientRepository::new(self.executor.clone())
    }
}
