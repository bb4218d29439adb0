//! Maintenance of the precomputed batter season aggregate table.

use diesel::sql_types::BigInt;
use diesel::QueryableByName;
use diesel_async::{AsyncConnection, RunQueryDsl, SimpleAsyncConnection};

use super::batters::{season_aggregate_sql, SeasonScope, SEASON_CACHE_TABLE};
use super::pool::{DbPool, DieselError, StoreError};
use crate::with_conn;

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    total: i64,
}

#[derive(Clone)]
pub struct AggregateRepository {
    pool: DbPool,
}

impl AggregateRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Rebuild the cache from `deliveries`. Returns the number of rows written.
    pub async fn refresh(&self) -> Result<i64, StoreError> {
        let create = format!(
            "CREATE TABLE {SEASON_CACHE_TABLE} AS {}",
            season_aggregate_sql(SeasonScope::AllBatters)
        );
        let index = format!(
            "CREATE INDEX idx_{SEASON_CACHE_TABLE}_key ON {SEASON_CACHE_TABLE} (batter_key, season)"
        );
        let drop_sql = format!("DROP TABLE IF EXISTS {SEASON_CACHE_TABLE}");

        with_conn!(self.pool, conn => {
            conn.transaction(|conn| {
                Box::pin(async move {
                    conn.batch_execute(&drop_sql).await?;
                    conn.batch_execute(&create).await?;
                    conn.batch_execute(&index).await?;
                    Ok::<_, DieselError>(())
                })
            })
            .await?;
        });

        self.row_count().await
    }

    /// Remove the cache; readers fall back to live aggregation.
    pub async fn drop_cache(&self) -> Result<(), StoreError> {
        with_conn!(self.pool, conn => {
            conn.batch_execute(&format!("DROP TABLE IF EXISTS {SEASON_CACHE_TABLE}"))
                .await?;
            Ok(())
        })
    }

    /// Whether the cache table exists. A failing count query means it doesn't;
    /// connection and pool errors are returned as-is.
    pub async fn exists(&self) -> Result<bool, StoreError> {
        match self.row_count().await {
            Ok(_) => Ok(true),
            Err(StoreError::Query(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn row_count(&self) -> Result<i64, StoreError> {
        let rows: Vec<CountRow> = with_conn!(self.pool, conn => {
            diesel::sql_query(format!("SELECT COUNT(*) AS total FROM {SEASON_CACHE_TABLE}"))
                .load(conn)
                .await?
        });
        Ok(rows.into_iter().next().map_or(0, |row| row.total))
    }
}
