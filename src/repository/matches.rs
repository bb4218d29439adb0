//! Match metadata and season listing.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::MatchRecord;
use super::pool::{DbPool, StoreError};
use crate::models::{cmp_seasons_newest_first, MatchInfo};
use crate::schema::matches;
use crate::with_conn;

#[derive(Clone)]
pub struct MatchRepository {
    pool: DbPool,
}

impl MatchRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a match by ID.
    pub async fn get(&self, match_id: i64) -> Result<Option<MatchInfo>, StoreError> {
        let record: Option<MatchRecord> = with_conn!(self.pool, conn => {
            matches::table
                .find(match_id)
                .select(MatchRecord::as_select())
                .first(conn)
                .await
                .optional()?
        });
        Ok(record.map(MatchInfo::from))
    }

    /// Distinct seasons, newest first by start year.
    pub async fn seasons(&self) -> Result<Vec<String>, StoreError> {
        let mut seasons: Vec<String> = with_conn!(self.pool, conn => {
            matches::table
                .select(matches::season)
                .distinct()
                .load(conn)
                .await?
        });
        seasons.sort_by(|a, b| cmp_seasons_newest_first(a, b));
        Ok(seasons)
    }
}
