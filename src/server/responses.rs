//! Response bodies for the HTTP API.

use serde::Serialize;
use serde_json::Value;

use crate::models::{
    BattingLine, CareerProfile, DismissalCounts, Encounter, MatchInfo, MatchupStats, Phase,
    PlayerMatches, RecentForm, RecentMatch, SeasonProfile,
};
use crate::repository::PlayerPage;

#[derive(Debug, Serialize)]
pub struct PhaseStats {
    pub runs: i64,
    pub balls: i64,
    pub strike_rate: f64,
    pub outs: i64,
    pub average: Option<f64>,
}

impl From<BattingLine> for PhaseStats {
    fn from(line: BattingLine) -> Self {
        Self {
            runs: line.runs,
            balls: line.balls,
            strike_rate: line.strike_rate(),
            outs: line.outs,
            average: line.average(),
        }
    }
}

/// Phases absent from the aggregate are omitted.
#[derive(Debug, Default, Serialize)]
pub struct PhaseBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub powerplay: Option<PhaseStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle: Option<PhaseStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death: Option<PhaseStats>,
}

impl PhaseBreakdown {
    pub fn from_lines(lines: impl IntoIterator<Item = (Phase, BattingLine)>) -> Self {
        let mut breakdown = Self::default();
        for (phase, line) in lines {
            let slot = match phase {
                Phase::Powerplay => &mut breakdown.powerplay,
                Phase::Middle => &mut breakdown.middle,
                Phase::Death => &mut breakdown.death,
            };
            *slot = Some(line.into());
        }
        breakdown
    }

    pub fn is_empty(&self) -> bool {
        self.powerplay.is_none() && self.middle.is_none() && self.death.is_none()
    }
}

#[derive(Debug, Default, Serialize)]
pub struct DismissalStats {
    pub caught: i64,
    pub bowled: i64,
    pub lbw: i64,
    pub stumped: i64,
}

impl From<DismissalCounts> for DismissalStats {
    fn from(d: DismissalCounts) -> Self {
        Self {
            caught: d.caught,
            bowled: d.bowled,
            lbw: d.lbw,
            stumped: d.stumped,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CareerStats {
    pub matches: i64,
    pub runs: i64,
    pub balls: i64,
    pub outs: i64,
    pub average: Option<f64>,
    pub strike_rate: f64,
    pub highest_score: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct BatterProfileResponse {
    pub batter: String,
    pub career: CareerStats,
    pub phase_performance: PhaseBreakdown,
    pub dismissals: DismissalStats,
}

impl From<CareerProfile> for BatterProfileResponse {
    fn from(p: CareerProfile) -> Self {
        Self {
            career: CareerStats {
                matches: p.matches,
                runs: p.line.runs,
                balls: p.line.balls,
                outs: p.line.outs,
                average: p.line.average(),
                strike_rate: p.line.strike_rate(),
                highest_score: p.highest_score,
            },
            phase_performance: PhaseBreakdown::from_lines(p.phases.reported(1)),
            dismissals: p.dismissals.into(),
            batter: p.batter,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeasonProfileResponse {
    pub season: String,
    pub matches: i64,
    pub runs: i64,
    pub balls: i64,
    pub outs: i64,
    pub average: Option<f64>,
    pub strike_rate: f64,
    pub highest_score: i64,
    pub phase_performance: PhaseBreakdown,
    pub dismissals: DismissalStats,
}

impl From<SeasonProfile> for SeasonProfileResponse {
    fn from(s: SeasonProfile) -> Self {
        Self {
            matches: s.matches,
            runs: s.line.runs,
            balls: s.line.balls,
            outs: s.line.outs,
            average: s.line.average(),
            strike_rate: s.line.strike_rate(),
            highest_score: s.highest_score,
            phase_performance: PhaseBreakdown::from_lines(s.phases.reported(1)),
            dismissals: s.dismissals.into(),
            season: s.season,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatterSeasonProfileResponse {
    pub batter: String,
    pub total_seasons: usize,
    pub seasons: Vec<SeasonProfileResponse>,
}

impl BatterSeasonProfileResponse {
    pub fn new(batter: String, seasons: Vec<SeasonProfile>) -> Self {
        Self {
            batter,
            total_seasons: seasons.len(),
            seasons: seasons.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecentMatchResponse {
    pub match_id: i64,
    pub season: String,
    pub venue: String,
    pub runs: i64,
    pub balls: i64,
    pub dismissed: bool,
    pub strike_rate: f64,
}

impl From<RecentMatch> for RecentMatchResponse {
    fn from(m: RecentMatch) -> Self {
        Self {
            dismissed: m.dismissed(),
            match_id: m.match_id,
            season: m.season,
            venue: m.venue,
            runs: m.line.runs,
            balls: m.line.balls,
            strike_rate: m.line.strike_rate(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecentFormSummary {
    pub matches: usize,
    pub runs: i64,
    pub balls: i64,
    pub outs: i64,
    pub average: Option<f64>,
    pub strike_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct BatterRecentFormResponse {
    pub batter: String,
    pub recent_matches: Vec<RecentMatchResponse>,
    pub summary: RecentFormSummary,
}

impl From<RecentForm> for BatterRecentFormResponse {
    fn from(form: RecentForm) -> Self {
        let total = form.summary();
        Self {
            summary: RecentFormSummary {
                matches: form.matches.len(),
                runs: total.runs,
                balls: total.balls,
                outs: total.outs,
                average: total.average(),
                strike_rate: total.strike_rate(),
            },
            recent_matches: form.matches.into_iter().map(Into::into).collect(),
            batter: form.batter,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchupOverall {
    pub runs: i64,
    pub balls: i64,
    pub dismissals: i64,
    pub strike_rate: f64,
    pub average: Option<f64>,
    pub confidence_score: u8,
}

#[derive(Debug, Serialize)]
pub struct RecentEncounter {
    pub match_id: i64,
    pub season: String,
    pub venue: String,
    pub runs: i64,
    pub balls: i64,
    pub dismissed: bool,
}

impl From<Encounter> for RecentEncounter {
    fn from(e: Encounter) -> Self {
        Self {
            dismissed: e.dismissed(),
            match_id: e.match_id,
            season: e.season,
            venue: e.venue,
            runs: e.line.runs,
            balls: e.line.balls,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchupResponse {
    pub batter: String,
    pub bowler: String,
    pub overall: MatchupOverall,
    /// `null` when phases were not requested or none reached the ball floor.
    pub phase_breakdown: Option<PhaseBreakdown>,
    pub recent_encounters: Vec<RecentEncounter>,
}

impl From<MatchupStats> for MatchupResponse {
    fn from(m: MatchupStats) -> Self {
        let confidence_score = m.confidence();
        let phases = PhaseBreakdown::from_lines(m.phases);
        Self {
            overall: MatchupOverall {
                runs: m.overall.runs,
                balls: m.overall.balls,
                dismissals: m.overall.outs,
                strike_rate: m.overall.strike_rate(),
                average: m.overall.average(),
                confidence_score,
            },
            phase_breakdown: (!phases.is_empty()).then_some(phases),
            recent_encounters: m.recent.into_iter().map(Into::into).collect(),
            batter: m.batter,
            bowler: m.bowler,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlayerListResponse {
    pub players: Vec<String>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PlayerListResponse {
    pub fn new(page: PlayerPage, limit: i64, offset: i64) -> Self {
        Self {
            players: page.players,
            total: page.total,
            limit,
            offset,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlayerSearchEntry {
    pub name: String,
    pub matches: i64,
}

#[derive(Debug, Serialize)]
pub struct PlayerSearchResponse {
    pub players: Vec<PlayerSearchEntry>,
}

impl From<Vec<PlayerMatches>> for PlayerSearchResponse {
    fn from(players: Vec<PlayerMatches>) -> Self {
        Self {
            players: players
                .into_iter()
                .map(|p| PlayerSearchEntry {
                    name: p.name,
                    matches: p.matches,
                })
                .collect(),
        }
    }
}

/// Team names, date and toss are not stored; they are always `null`.
#[derive(Debug, Serialize)]
pub struct MatchInfoResponse {
    pub match_id: i64,
    pub season: String,
    pub venue: String,
    pub teams: Option<Value>,
    pub date: Option<String>,
    pub toss: Option<Value>,
}

impl From<MatchInfo> for MatchInfoResponse {
    fn from(m: MatchInfo) -> Self {
        Self {
            match_id: m.match_id,
            season: m.season,
            venue: m.venue,
            teams: None,
            date: None,
            toss: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeasonsResponse {
    pub seasons: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub name: &'static str,
    pub version: String,
    pub api_prefix: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_phase_breakdown_omits_absent_phases() {
        let breakdown = PhaseBreakdown::from_lines([(Phase::Middle, BattingLine::new(15, 10, 0))]);
        let value = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(
            value,
            json!({"middle": {"runs": 15, "balls": 10, "strike_rate": 150.0, "outs": 0, "average": null}})
        );
    }

    #[test]
    fn test_matchup_without_phases_is_null() {
        let stats = MatchupStats {
            batter: "V Kohli".into(),
            bowler: "DW Steyn".into(),
            overall: BattingLine::new(22, 7, 1),
            phases: Vec::new(),
            recent: Vec::new(),
        };
        let value = serde_json::to_value(MatchupResponse::from(stats)).unwrap();
        assert_eq!(value["phase_breakdown"], Value::Null);
        assert_eq!(value["overall"]["confidence_score"], 14);
        assert_eq!(value["overall"]["dismissals"], 1);
        assert_eq!(value["overall"]["average"], 22.0);
    }

    #[test]
    fn test_match_info_gaps_are_null() {
        let value = serde_json::to_value(MatchInfoResponse::from(MatchInfo {
            match_id: 1,
            season: "2011".into(),
            venue: "Wankhede Stadium".into(),
        }))
        .unwrap();
        assert_eq!(value["teams"], Value::Null);
        assert_eq!(value["date"], Value::Null);
        assert_eq!(value["toss"], Value::Null);
    }
}
