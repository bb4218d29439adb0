//! Database context for managing connections and repository access.
//!
//! The DbContext is the primary entry point for all database operations.
//! It is constructed once at process start, cloned into whatever needs store
//! access, and closed at shutdown.

use diesel_async::SimpleAsyncConnection;

use super::aggregates::AggregateRepository;
use super::batters::BatterRepository;
use super::deliveries::DeliveryRepository;
use super::matches::MatchRepository;
use super::matchups::MatchupRepository;
use super::players::PlayerRepository;
use super::pool::{DbPool, PoolOptions, StoreError};
use crate::{with_conn, with_conn_split};

const SQLITE_SCHEMA: &str = r#"
    PRAGMA journal_mode = WAL;

    CREATE TABLE IF NOT EXISTS players (
        player_name TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS matches (
        match_id INTEGER PRIMARY KEY,
        season TEXT NOT NULL,
        venue TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS deliveries (
        match_id INTEGER NOT NULL REFERENCES matches(match_id),
        innings INTEGER NOT NULL,
        delivery_seq INTEGER NOT NULL,
        season TEXT NOT NULL,
        venue TEXT NOT NULL,
        over_number INTEGER NOT NULL,
        ball INTEGER NOT NULL,
        batting_team TEXT NOT NULL,
        batter TEXT NOT NULL,
        bowler TEXT NOT NULL,
        non_striker TEXT NOT NULL,
        runs_batter INTEGER NOT NULL CHECK (runs_batter >= 0),
        runs_extras INTEGER NOT NULL CHECK (runs_extras >= 0),
        extras_type TEXT,
        is_legal_ball BOOLEAN NOT NULL,
        is_wicket BOOLEAN NOT NULL,
        dismissed_batter TEXT,
        wicket_type TEXT,
        phase TEXT NOT NULL CHECK (phase IN ('powerplay', 'middle', 'death')),
        PRIMARY KEY (match_id, innings, delivery_seq)
    );

    CREATE UNIQUE INDEX IF NOT EXISTS idx_players_name_lower ON players (LOWER(player_name));
    CREATE INDEX IF NOT EXISTS idx_deliveries_batter ON deliveries (LOWER(batter));
    CREATE INDEX IF NOT EXISTS idx_deliveries_bowler ON deliveries (LOWER(bowler));
    CREATE INDEX IF NOT EXISTS idx_deliveries_dismissed ON deliveries (LOWER(dismissed_batter));
    CREATE INDEX IF NOT EXISTS idx_deliveries_season ON deliveries (season);
"#;

#[cfg(feature = "postgres")]
const POSTGRES_SCHEMA: [&str; 8] = [
    r#"CREATE TABLE IF NOT EXISTS players (
        player_name TEXT PRIMARY KEY
    )"#,
    r#"CREATE TABLE IF NOT EXISTS matches (
        match_id BIGINT PRIMARY KEY,
        season TEXT NOT NULL,
        venue TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS deliveries (
        match_id BIGINT NOT NULL REFERENCES matches(match_id),
        innings INTEGER NOT NULL,
        delivery_seq INTEGER NOT NULL,
        season TEXT NOT NULL,
        venue TEXT NOT NULL,
        over_number INTEGER NOT NULL,
        ball INTEGER NOT NULL,
        batting_team TEXT NOT NULL,
        batter TEXT NOT NULL,
        bowler TEXT NOT NULL,
        non_striker TEXT NOT NULL,
        runs_batter INTEGER NOT NULL CHECK (runs_batter >= 0),
        runs_extras INTEGER NOT NULL CHECK (runs_extras >= 0),
        extras_type TEXT,
        is_legal_ball BOOLEAN NOT NULL,
        is_wicket BOOLEAN NOT NULL,
        dismissed_batter TEXT,
        wicket_type TEXT,
        phase TEXT NOT NULL CHECK (phase IN ('powerplay', 'middle', 'death')),
        PRIMARY KEY (match_id, innings, delivery_seq)
    )"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_players_name_lower ON players (LOWER(player_name))",
    "CREATE INDEX IF NOT EXISTS idx_deliveries_batter ON deliveries (LOWER(batter))",
    "CREATE INDEX IF NOT EXISTS idx_deliveries_bowler ON deliveries (LOWER(bowler))",
    "CREATE INDEX IF NOT EXISTS idx_deliveries_dismissed ON deliveries (LOWER(dismissed_batter))",
    "CREATE INDEX IF NOT EXISTS idx_deliveries_season ON deliveries (season)",
];

/// Database context that manages the connection pool and provides repository access.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::from_url("sqlite:ipl.db", PoolOptions::default())?;
/// ctx.init_schema().await?;
/// let seasons = ctx.matches().seasons().await?;
/// ```
#[derive(Clone)]
pub struct DbContext {
    pool: DbPool,
}

impl DbContext {
    /// Create a context from a database URL.
    ///
    /// Supports:
    /// - SQLite: file paths or `sqlite:` URLs
    /// - PostgreSQL: `postgres://` or `postgresql://` URLs
    pub fn from_url(url: &str, options: PoolOptions) -> Result<Self, StoreError> {
        Ok(Self {
            pool: DbPool::from_url(url, options)?,
        })
    }

    /// Create a context with an existing pool.
    pub fn with_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn deliveries(&self) -> DeliveryRepository {
        DeliveryRepository::new(self.pool.clone())
    }

    pub fn players(&self) -> PlayerRepository {
        PlayerRepository::new(self.pool.clone())
    }

    pub fn matches(&self) -> MatchRepository {
        MatchRepository::new(self.pool.clone())
    }

    pub fn batters(&self) -> BatterRepository {
        BatterRepository::new(self.pool.clone())
    }

    pub fn matchups(&self) -> MatchupRepository {
        MatchupRepository::new(self.pool.clone())
    }

    pub fn aggregates(&self) -> AggregateRepository {
        AggregateRepository::new(self.pool.clone())
    }

    /// Create the delivery store tables and indexes if they don't exist.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        with_conn_split!(self.pool,
            sqlite: conn => {
                conn.batch_execute(SQLITE_SCHEMA).await?;
                Ok(())
            },
            postgres: conn => {
                for statement in POSTGRES_SCHEMA {
                    conn.batch_execute(statement).await?;
                }
                Ok(())
            }
        )
    }

    /// Round-trip a trivial query to prove the store is reachable.
    pub async fn test_connection(&self) -> Result<(), StoreError> {
        with_conn!(self.pool, conn => {
            conn.batch_execute("SELECT 1").await?;
            Ok(())
        })
    }

    /// Rebuild the batter season aggregate table. Returns its row count.
    pub async fn refresh_aggregates(&self) -> Result<i64, StoreError> {
        self.aggregates().refresh().await
    }

    pub async fn drop_aggregates(&self) -> Result<(), StoreError> {
        self.aggregates().drop_cache().await
    }

    /// Close the pool; later queries fail with [`StoreError::PoolClosed`].
    pub fn close(&self) {
        self.pool.close();
    }
}
