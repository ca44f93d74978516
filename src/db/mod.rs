//! Database connection pool lifecycle management.
//!
//! This module provides:
//! - The PostgreSQL pool type and the [`Database`] handle that the rest of the app queries through
//! - Pool sizing per execution context ([`policy`])
//! - The development-only cache that survives reloads ([`cache`])
//! - The platform suspension hook ([`hook`])
//! - The supervisor that wires all of the above together at startup ([`supervisor`])

pub mod cache;
pub mod hook;
pub mod policy;
pub mod supervisor;

use std::sync::Arc;

use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres, Transaction};

use self::policy::PoolSizingParams;

/// Type alias for PostgreSQL connection pool.
///
/// Instead of writing `Pool<Postgres>` everywhere, we can use `DbPool`.
pub type DbPool = Pool<Postgres>;

/// Capability for opening a new connection pool.
///
/// The supervisor only ever constructs pools through this trait, so tests can
/// count constructions and hand out pools that never touch a real server.
pub trait PoolConnector: Send + Sync {
    fn connect(
        &self,
        database_url: &str,
        sizing: PoolSizingParams,
    ) -> impl Future<Output = Result<DbPool, sqlx::Error>> + Send;
}

/// Opens a real PostgreSQL pool.
///
/// The first physical connection is established before `connect` returns, so a
/// wrong password or unreachable host fails startup instead of the first request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

impl PoolConnector for PgConnector {
    async fn connect(
        &self,
        database_url: &str,
        sizing: PoolSizingParams,
    ) -> Result<DbPool, sqlx::Error> {
        pool_options(sizing).connect(database_url).await
    }
}

/// Pool options derived from the sizing parameters.
///
/// # Configuration
///
/// - Maximum connections: `sizing.max_connections`
/// - Idle connections are closed after `sizing.idle_timeout()`
/// - Everything else keeps sqlx defaults (acquire timeout, max lifetime)
pub fn pool_options(sizing: PoolSizingParams) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(sizing.max_connections)
        .idle_timeout(sizing.idle_timeout())
}

/// Query-capable handle bound to exactly one pool.
///
/// Holds a shared reference to the pool, so it can never outlive it.
#[derive(Debug)]
pub struct Database {
    pool: Arc<DbPool>,
}

/// Point-in-time view of pool usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    /// Open physical connections (idle + checked out)
    pub size: u32,

    /// Connections currently sitting idle in the pool
    pub idle: usize,

    pub max_connections: u32,

    /// Set once the pool has been shut down
    pub closed: bool,
}

impl Database {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Borrow the pool for building queries.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Verify database connectivity with a `SELECT 1` round trip.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }

    /// Start a database transaction on a pooled connection.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            max_connections: self.pool.options().get_max_connections(),
            closed: self.pool.is_closed(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::lazy_pool;
    use super::*;
    use crate::context::ExecutionContext;

    #[tokio::test]
    async fn pool_options_carry_sizing() {
        let sizing = PoolSizingParams::for_context(ExecutionContext::Production);
        let options = pool_options(sizing);

        assert_eq!(options.get_max_connections(), 10);
        assert_eq!(options.get_idle_timeout(), Some(sizing.idle_timeout()));
    }

    #[tokio::test]
    async fn status_reflects_a_fresh_lazy_pool() {
        let sizing = PoolSizingParams::for_context(ExecutionContext::Test);
        let db = Database::new(Arc::new(lazy_pool(sizing)));

        let status = db.status();
        assert_eq!(status.size, 0);
        assert_eq!(status.idle, 0);
        assert_eq!(status.max_connections, 5);
        assert!(!status.closed);

        db.pool().close().await;
        assert!(db.status().closed);
    }

    #[tokio::test]
    async fn ping_fails_when_database_is_unreachable() {
        let sizing = PoolSizingParams::for_context(ExecutionContext::Test);
        let db = Database::new(Arc::new(lazy_pool(sizing)));

        assert!(db.ping().await.is_err());
        assert!(db.begin().await.is_err());
    }
}
