//! Bounded connection pool supporting SQLite and PostgreSQL.
//!
//! The backend is picked at runtime from the database URL. Both backends sit
//! behind a deadpool pool: callers wait at most `acquire_timeout` for a
//! connection and the connection goes back to the pool when the guard drops,
//! whatever the outcome of the work done with it.

use std::time::Duration;

use deadpool::managed::{self, Metrics, PoolError, RecycleResult};
use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};

#[cfg(feature = "postgres")]
use diesel_async::pooled_connection::deadpool::Pool as DeadPool;
#[cfg(feature = "postgres")]
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
#[cfg(feature = "postgres")]
use diesel_async::AsyncPgConnection;

use super::util::{is_postgres_url, sqlite_path, to_diesel_error};

/// Diesel error type alias.
pub type DieselError = diesel::result::Error;

/// Async SQLite connection type.
pub type SqliteConn = SyncConnectionWrapper<SqliteConnection>;

/// Pragmas applied to every new SQLite connection.
const SQLITE_CONNECTION_PRAGMAS: &str = "PRAGMA busy_timeout = 30000; PRAGMA foreign_keys = ON;";

/// Errors raised by the store access layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(#[from] DieselError),
    #[error("database connection failed: {0}")]
    Connection(String),
    #[error("timed out after {0:?} waiting for a database connection")]
    PoolTimeout(Duration),
    #[error("connection pool is closed")]
    PoolClosed,
}

impl StoreError {
    fn from_pool<E: std::fmt::Display>(err: PoolError<E>, waited: Duration) -> Self {
        match err {
            PoolError::Timeout(_) => StoreError::PoolTimeout(waited),
            PoolError::Closed => StoreError::PoolClosed,
            other => StoreError::Connection(other.to_string()),
        }
    }
}

/// Pool sizing and acquisition limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Connections opened eagerly by [`DbPool::warm_up`].
    pub min_size: usize,
    /// Upper bound on live connections.
    pub max_size: usize,
    /// How long a caller may wait for a free connection.
    pub acquire_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            min_size: 1,
            max_size: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// deadpool manager that opens SQLite connections on demand.
#[derive(Debug)]
pub struct SqliteManager {
    database_url: String,
}

impl managed::Manager for SqliteManager {
    type Type = SqliteConn;
    type Error = DieselError;

    async fn create(&self) -> Result<SqliteConn, DieselError> {
        let mut conn = SqliteConn::establish(&self.database_url)
            .await
            .map_err(to_diesel_error)?;
        conn.batch_execute(SQLITE_CONNECTION_PRAGMAS).await?;
        Ok(conn)
    }

    async fn recycle(&self, conn: &mut SqliteConn, _: &Metrics) -> RecycleResult<DieselError> {
        conn.batch_execute("SELECT 1").await?;
        Ok(())
    }
}

/// Pooled SQLite connections.
#[derive(Clone)]
pub struct SqlitePool {
    pool: managed::Pool<SqliteManager>,
    database_url: String,
    acquire_timeout: Duration,
}

impl SqlitePool {
    /// Create a new SQLite pool. Accepts plain paths or `sqlite:` URLs.
    pub fn new(database_url: &str, options: PoolOptions) -> Result<Self, StoreError> {
        let path = sqlite_path(database_url).to_string();
        let manager = SqliteManager {
            database_url: path.clone(),
        };
        let pool = managed::Pool::builder(manager)
            .max_size(options.max_size.max(1))
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self {
            pool,
            database_url: path,
            acquire_timeout: options.acquire_timeout,
        })
    }

    /// Borrow a connection, waiting at most the configured timeout.
    pub async fn get(&self) -> Result<managed::Object<SqliteManager>, StoreError> {
        match tokio::time::timeout(self.acquire_timeout, self.pool.get()).await {
            Ok(result) => result.map_err(|e| StoreError::from_pool(e, self.acquire_timeout)),
            Err(_) => Err(StoreError::PoolTimeout(self.acquire_timeout)),
        }
    }

    /// Get the database path.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn close(&self) {
        self.pool.close();
    }
}

/// Pooled PostgreSQL connections.
#[cfg(feature = "postgres")]
#[derive(Clone)]
pub struct PgPool {
    pool: DeadPool<AsyncPgConnection>,
    acquire_timeout: Duration,
}

#[cfg(feature = "postgres")]
impl PgPool {
    /// Create a new PostgreSQL pool.
    pub fn new(database_url: &str, options: PoolOptions) -> Result<Self, StoreError> {
        let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = DeadPool::builder(config)
            .max_size(options.max_size.max(1))
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self {
            pool,
            acquire_timeout: options.acquire_timeout,
        })
    }

    /// Borrow a connection, waiting at most the configured timeout.
    pub async fn get(
        &self,
    ) -> Result<managed::Object<AsyncDieselConnectionManager<AsyncPgConnection>>, StoreError>
    {
        match tokio::time::timeout(self.acquire_timeout, self.pool.get()).await {
            Ok(result) => result.map_err(|e| StoreError::from_pool(e, self.acquire_timeout)),
            Err(_) => Err(StoreError::PoolTimeout(self.acquire_timeout)),
        }
    }

    pub fn close(&self) {
        self.pool.close();
    }
}

/// Unified database pool that supports both SQLite and PostgreSQL.
#[derive(Clone)]
pub enum DbPool {
    Sqlite(SqlitePool),
    #[cfg(feature = "postgres")]
    Postgres(PgPool),
}

impl DbPool {
    /// Create a pool from a database URL.
    ///
    /// `postgres://` and `postgresql://` select PostgreSQL (when built with
    /// the `postgres` feature); everything else is treated as a SQLite path.
    pub fn from_url(url: &str, options: PoolOptions) -> Result<Self, StoreError> {
        if is_postgres_url(url) {
            #[cfg(feature = "postgres")]
            return Ok(DbPool::Postgres(PgPool::new(url, options)?));

            #[cfg(not(feature = "postgres"))]
            return Err(StoreError::Connection(
                "PostgreSQL support requires the `postgres` feature".to_string(),
            ));
        }

        Ok(DbPool::Sqlite(SqlitePool::new(url, options)?))
    }

    /// Check if this is a SQLite backend.
    pub fn is_sqlite(&self) -> bool {
        matches!(self, DbPool::Sqlite(_))
    }

    /// Open up to `count` connections so the first requests do not pay for
    /// connection setup.
    pub async fn warm_up(&self, count: usize) -> Result<(), StoreError> {
        match self {
            DbPool::Sqlite(pool) => {
                let mut held = Vec::with_capacity(count);
                for _ in 0..count {
                    held.push(pool.get().await?);
                }
            }
            #[cfg(feature = "postgres")]
            DbPool::Postgres(pool) => {
                let mut held = Vec::with_capacity(count);
                for _ in 0..count {
                    held.push(pool.get().await?);
                }
            }
        }
        Ok(())
    }

    /// Close the pool. Outstanding connections are dropped when returned and
    /// later acquisitions fail with [`StoreError::PoolClosed`].
    pub fn close(&self) {
        match self {
            DbPool::Sqlite(pool) => pool.close(),
            #[cfg(feature = "postgres")]
            DbPool::Postgres(pool) => pool.close(),
        }
    }
}

/// Macro for running database operations on either backend.
///
/// Binds `$conn` to a `&mut` connection borrowed from the pool; the pooled
/// object is released when the block ends.
///
/// # Example
/// ```ignore
/// with_conn!(self.pool, conn => {
///     players::table.count().get_result::<i64>(conn).await
/// })
/// ```
#[macro_export]
macro_rules! with_conn {
    ($pool:expr, $conn:ident => $body:expr) => {{
        match &$pool {
            $crate::repository::pool::DbPool::Sqlite(pool) => {
                let mut pooled = pool.get().await?;
                let $conn = &mut *pooled;
                $body
            }
            #[cfg(feature = "postgres")]
            $crate::repository::pool::DbPool::Postgres(pool) => {
                let mut pooled = pool.get().await?;
                let $conn = &mut *pooled;
                $body
            }
        }
    }};
}

/// Macro for running database operations that need different SQL per backend.
///
/// # Example
/// ```ignore
/// with_conn_split!(self.pool,
///     sqlite: conn => { conn.batch_execute(SQLITE_SCHEMA).await },
///     postgres: conn => { create_pg_schema(conn).await }
/// )
/// ```
#[macro_export]
macro_rules! with_conn_split {
    ($pool:expr, sqlite: $sqlite_conn:ident => $sqlite_body:expr, postgres: $pg_conn:ident => $pg_body:expr) => {{
        match &$pool {
            $crate::repository::pool::DbPool::Sqlite(pool) => {
                let mut pooled = pool.get().await?;
                let $sqlite_conn = &mut *pooled;
                $sqlite_body
            }
            #[cfg(feature = "postgres")]
            $crate::repository::pool::DbPool::Postgres(pool) => {
                let mut pooled = pool.get().await?;
                let $pg_conn = &mut *pooled;
                $pg_body
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn options(max_size: usize, timeout_ms: u64) -> PoolOptions {
        PoolOptions {
            min_size: 0,
            max_size,
            acquire_timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[tokio::test]
    async fn test_exhausted_pool_times_out() {
        let dir = tempdir().unwrap();
        let url = dir.path().join("pool.db").display().to_string();
        let pool = SqlitePool::new(&url, options(1, 50)).unwrap();

        let held = pool.get().await.unwrap();
        let err = pool.get().await.err().unwrap();
        assert!(matches!(err, StoreError::PoolTimeout(_)));

        drop(held);
        assert!(pool.get().await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_pool_rejects_acquire() {
        let dir = tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("pool.db").display());
        let pool = DbPool::from_url(&url, options(2, 1000)).unwrap();
        assert!(pool.is_sqlite());
        pool.warm_up(2).await.unwrap();
        pool.close();

        let sqlite = SqlitePool::new(&url, options(2, 1000)).unwrap();
        assert!(sqlite.database_url().ends_with("pool.db"));
        sqlite.close();
        assert!(matches!(sqlite.get().await, Err(StoreError::PoolClosed)));
    }

    #[cfg(not(feature = "postgres"))]
    #[test]
    fn test_postgres_url_without_feature() {
        let result = DbPool::from_url("postgres://localhost/ipl", PoolOptions::default());
        assert!(matches!(result, Err(StoreError::Connection(_))));
    }
}
