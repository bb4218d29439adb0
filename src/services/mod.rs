//! Service layer for the analytics API.
//!
//! Services resolve player names, check request bounds and turn store results
//! into domain values. They are shared by the HTTP handlers and the CLI.

pub mod batters;
pub mod error;
pub mod matches;
pub mod matchups;
pub mod players;

pub use batters::{BatterService, MAX_RECENT_MATCHES};
pub use error::ServiceError;
pub use matches::MatchService;
pub use matchups::MatchupService;
pub use players::{PlayerService, MAX_LIST_LIMIT, MAX_SEARCH_LIMIT, MIN_SEARCH_CHARS};

use crate::repository::DbContext;

/// Look up the stored spelling of a player, or fail with NotFound.
pub(crate) async fn resolve_player(ctx: &DbContext, name: &str) -> Result<String, ServiceError> {
    ctx.players()
        .resolve(name)
        .await?
        .ok_or_else(|| ServiceError::not_found("Player", name))
}
