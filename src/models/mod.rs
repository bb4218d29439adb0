//! Domain models for deliveries and batting aggregates.

mod delivery;
mod stats;

pub use delivery::{Delivery, Phase};
pub use stats::{
    cmp_seasons_newest_first, confidence_score, round2, season_start_year, BattingLine,
    CareerProfile, DismissalCounts, Encounter, MatchInfo, MatchupStats, PhaseLines,
    PlayerMatches, RecentForm, RecentMatch, SeasonProfile, MIN_MATCHUP_PHASE_BALLS,
};
