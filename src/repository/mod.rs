//! Repository layer for the delivery store.
//!
//! All database access goes through Diesel against either SQLite or
//! PostgreSQL, selected at runtime by the database URL.

pub mod aggregates;
pub mod batters;
pub mod context;
pub mod deliveries;
pub mod matches;
pub mod matchups;
pub mod models;
pub mod players;
pub mod pool;
#[cfg(test)]
pub(crate) mod testing;
pub mod util;

pub use aggregates::AggregateRepository;
pub use batters::BatterRepository;
pub use context::DbContext;
pub use deliveries::{DeliveryRepository, StoredMatch, TableCounts};
pub use matches::MatchRepository;
pub use matchups::{MatchupQuery, MatchupRepository};
pub use players::{PlayerPage, PlayerRepository};
pub use pool::{DbPool, DieselError, PoolOptions, StoreError};
