//! Ball-by-ball delivery record.

use serde::{Deserialize, Serialize};

/// Match phase derived from the 0-indexed over number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Powerplay,
    Middle,
    Death,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Powerplay, Phase::Middle, Phase::Death];

    /// Overs 0-5 are powerplay, 6-14 middle, 15 onwards death.
    pub fn from_over(over: i32) -> Self {
        match over {
            i32::MIN..=5 => Self::Powerplay,
            6..=14 => Self::Middle,
            _ => Self::Death,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Powerplay => "powerplay",
            Self::Middle => "middle",
            Self::Death => "death",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "powerplay" => Some(Self::Powerplay),
            "middle" => Some(Self::Middle),
            "death" => Some(Self::Death),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ball bowled, legal or not.
///
/// Identity is `(match_id, innings, delivery_seq)`. `delivery_seq` restarts at 1
/// for every innings; `ball` only advances on legal deliveries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub match_id: i64,
    pub innings: i32,
    pub delivery_seq: i32,
    pub season: String,
    pub venue: String,
    pub over: i32,
    pub ball: i32,
    pub batting_team: String,
    pub batter: String,
    pub bowler: String,
    pub non_striker: String,
    pub runs_batter: i32,
    pub runs_extras: i32,
    pub extras_type: Option<String>,
    pub is_legal_ball: bool,
    pub is_wicket: bool,
    pub dismissed_batter: Option<String>,
    pub wicket_type: Option<String>,
    pub phase: Phase,
}

impl Delivery {
    pub fn total_runs(&self) -> i32 {
        self.runs_batter + self.runs_extras
    }

    /// Wides and no-balls do not count towards the over.
    pub fn is_legal<'a>(mut extras_kinds: impl Iterator<Item = &'a str>) -> bool {
        !extras_kinds.any(|kind| kind == "wides" || kind == "noballs")
    }

    /// Every player name this delivery mentions.
    pub fn player_names(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.batter.as_str()),
            Some(self.bowler.as_str()),
            Some(self.non_striker.as_str()),
            self.dismissed_batter.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}
