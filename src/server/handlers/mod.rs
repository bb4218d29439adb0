//! HTTP request handlers for the analytics API.

mod batters;
mod health;
mod helpers;
mod matches;
mod matchups;
mod players;

// Re-export handlers for use by the router
pub use batters::{batter_profile, batter_recent_form, batter_season_profile};
pub use health::{health, not_found, root};
pub use matches::{list_seasons, match_info};
pub use matchups::batter_bowler_matchup;
pub use players::{list_players, search_players};
