//! Write side of the delivery store.
//!
//! A match is stored as one unit of work: its players, the match row and every
//! delivery are inserted inside a single transaction. Each insert ignores rows
//! that already exist, so storing the same match twice changes nothing.

use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::models::{DeliveryRecord, NewDelivery, NewMatch, NewPlayer};
use super::pool::{DbPool, DieselError, StoreError};
use crate::models::Delivery;
use crate::schema::{deliveries, matches, players};
use crate::with_conn;

/// Rows actually inserted by [`DeliveryRepository::store_match`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoredMatch {
    pub players_added: usize,
    pub match_added: bool,
    pub deliveries_added: usize,
}

/// Row counts for the three store tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub players: i64,
    pub matches: i64,
    pub deliveries: i64,
}

#[derive(Clone)]
pub struct DeliveryRepository {
    pool: DbPool,
}

impl DeliveryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Store one match's deliveries along with its players and match row.
    ///
    /// The first delivery supplies the match's season and venue.
    pub async fn store_match(&self, match_deliveries: &[Delivery]) -> Result<StoredMatch, StoreError> {
        let Some(first) = match_deliveries.first() else {
            return Ok(StoredMatch::default());
        };

        let mut names: Vec<&str> = match_deliveries
            .iter()
            .flat_map(|d| d.player_names())
            .collect();
        names.sort_unstable();
        names.dedup();

        let new_match = NewMatch {
            match_id: first.match_id,
            season: &first.season,
            venue: &first.venue,
        };
        let rows: Vec<NewDelivery<'_>> = match_deliveries.iter().map(NewDelivery::from).collect();

        with_conn!(self.pool, conn => {
            let stored = conn
                .transaction(|conn| {
                    Box::pin(async move {
                        let mut players_added = 0;
                        for player_name in names {
                            players_added += diesel::insert_into(players::table)
                                .values(NewPlayer { player_name })
                                .on_conflict_do_nothing()
                                .execute(conn)
                                .await?;
                        }

                        let match_added = diesel::insert_into(matches::table)
                            .values(&new_match)
                            .on_conflict_do_nothing()
                            .execute(conn)
                            .await?
                            > 0;

                        let mut deliveries_added = 0;
                        for row in &rows {
                            deliveries_added += diesel::insert_into(deliveries::table)
                                .values(row)
                                .on_conflict_do_nothing()
                                .execute(conn)
                                .await?;
                        }

                        Ok::<_, DieselError>(StoredMatch {
                            players_added,
                            match_added,
                            deliveries_added,
                        })
                    })
                })
                .await?;
            Ok(stored)
        })
    }

    /// Load a match's deliveries in innings/sequence order.
    pub async fn for_match(&self, match_id: i64) -> Result<Vec<Delivery>, StoreError> {
        let records: Vec<DeliveryRecord> = with_conn!(self.pool, conn => {
            deliveries::table
                .filter(deliveries::match_id.eq(match_id))
                .order((deliveries::innings.asc(), deliveries::delivery_seq.asc()))
                .select(DeliveryRecord::as_select())
                .load(conn)
                .await?
        });
        Ok(records.into_iter().map(Delivery::from).collect())
    }

    pub async fn counts(&self) -> Result<TableCounts, StoreError> {
        with_conn!(self.pool, conn => {
            let players = players::table.count().get_result::<i64>(conn).await?;
            let matches = matches::table.count().get_result::<i64>(conn).await?;
            let deliveries = deliveries::table.count().get_result::<i64>(conn).await?;
            Ok(TableCounts {
                players,
                matches,
                deliveries,
            })
        })
    }
}
