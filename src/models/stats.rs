//! Batting aggregates and the ratio math shared by every report.
//!
//! Counts are carried as `i64` exactly as the store returns them; ratios are
//! derived on demand and rounded to two decimals.

use std::cmp::Ordering;
use std::ops::AddAssign;

use super::Phase;

/// Matchup phase buckets with fewer legal balls than this are suppressed.
pub const MIN_MATCHUP_PHASE_BALLS: i64 = 8;

/// Balls at which matchup confidence saturates.
const CONFIDENCE_SATURATION_BALLS: f64 = 50.0;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sample-size reliability for a matchup, 0 to 100.
///
/// Linear in balls faced, reaching 100 at 50 balls.
pub fn confidence_score(balls: i64) -> u8 {
    if balls <= 0 {
        return 0;
    }
    let score = (balls as f64 / CONFIDENCE_SATURATION_BALLS * 100.0).round();
    score.min(100.0) as u8
}

/// Leading start year of a season label ("2007/08" -> 2007, "2011" -> 2011).
pub fn season_start_year(season: &str) -> Option<i32> {
    let digits: String = season
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Newest-first season ordering with a string tie-break.
pub fn cmp_seasons_newest_first(a: &str, b: &str) -> Ordering {
    match (season_start_year(a), season_start_year(b)) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.cmp(a)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.cmp(a),
    }
}

/// Runs, legal balls and dismissals for some slice of deliveries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BattingLine {
    pub runs: i64,
    pub balls: i64,
    pub outs: i64,
}

impl BattingLine {
    pub fn new(runs: i64, balls: i64, outs: i64) -> Self {
        Self { runs, balls, outs }
    }

    /// Runs per 100 balls; 0.0 with no balls faced.
    pub fn strike_rate(&self) -> f64 {
        if self.balls == 0 {
            0.0
        } else {
            round2(self.runs as f64 / self.balls as f64 * 100.0)
        }
    }

    /// Runs per dismissal; `None` while not out.
    pub fn average(&self) -> Option<f64> {
        if self.outs == 0 {
            None
        } else {
            Some(round2(self.runs as f64 / self.outs as f64))
        }
    }
}

impl AddAssign for BattingLine {
    fn add_assign(&mut self, other: Self) {
        self.runs += other.runs;
        self.balls += other.balls;
        self.outs += other.outs;
    }
}

/// One batting line per phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseLines {
    pub powerplay: BattingLine,
    pub middle: BattingLine,
    pub death: BattingLine,
}

impl PhaseLines {
    pub fn get(&self, phase: Phase) -> &BattingLine {
        match phase {
            Phase::Powerplay => &self.powerplay,
            Phase::Middle => &self.middle,
            Phase::Death => &self.death,
        }
    }

    pub fn get_mut(&mut self, phase: Phase) -> &mut BattingLine {
        match phase {
            Phase::Powerplay => &mut self.powerplay,
            Phase::Middle => &mut self.middle,
            Phase::Death => &mut self.death,
        }
    }

    /// Phases with at least `min_balls` legal balls, in match order.
    pub fn reported(&self, min_balls: i64) -> Vec<(Phase, BattingLine)> {
        Phase::ALL
            .into_iter()
            .map(|phase| (phase, *self.get(phase)))
            .filter(|(_, line)| line.balls >= min_balls.max(1))
            .collect()
    }
}

impl AddAssign for PhaseLines {
    fn add_assign(&mut self, other: Self) {
        for phase in Phase::ALL {
            *self.get_mut(phase) += *other.get(phase);
        }
    }
}

/// Dismissals by kind. Kinds outside these four are only counted in `outs`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DismissalCounts {
    pub caught: i64,
    pub bowled: i64,
    pub lbw: i64,
    pub stumped: i64,
}

impl AddAssign for DismissalCounts {
    fn add_assign(&mut self, other: Self) {
        self.caught += other.caught;
        self.bowled += other.bowled;
        self.lbw += other.lbw;
        self.stumped += other.stumped;
    }
}

/// A batter's aggregate for one season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonProfile {
    pub season: String,
    pub matches: i64,
    pub line: BattingLine,
    pub phases: PhaseLines,
    pub dismissals: DismissalCounts,
    pub highest_score: i64,
}

/// A batter's aggregate across every season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareerProfile {
    pub batter: String,
    pub matches: i64,
    pub line: BattingLine,
    pub phases: PhaseLines,
    pub dismissals: DismissalCounts,
    pub highest_score: Option<i64>,
}

impl CareerProfile {
    /// Fold season rows into a career. `None` when there are no rows.
    ///
    /// A match belongs to exactly one season, so summing per-season distinct
    /// match counts gives the career distinct count.
    pub fn from_seasons(batter: impl Into<String>, seasons: &[SeasonProfile]) -> Option<Self> {
        if seasons.is_empty() {
            return None;
        }

        let mut career = CareerProfile {
            batter: batter.into(),
            matches: 0,
            line: BattingLine::default(),
            phases: PhaseLines::default(),
            dismissals: DismissalCounts::default(),
            highest_score: None,
        };
        for season in seasons {
            career.matches += season.matches;
            career.line += season.line;
            career.phases += season.phases;
            career.dismissals += season.dismissals;
            career.highest_score = Some(
                career
                    .highest_score
                    .map_or(season.highest_score, |best| best.max(season.highest_score)),
            );
        }
        Some(career)
    }
}

/// A batter's contribution to a single match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentMatch {
    pub match_id: i64,
    pub season: String,
    pub venue: String,
    pub line: BattingLine,
}

impl RecentMatch {
    pub fn dismissed(&self) -> bool {
        self.line.outs > 0
    }
}

/// Most recent matches for a batter, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentForm {
    pub batter: String,
    pub matches: Vec<RecentMatch>,
}

impl RecentForm {
    /// Totals across the selected matches; zeroed when there are none.
    pub fn summary(&self) -> BattingLine {
        let mut total = BattingLine::default();
        for m in &self.matches {
            total += m.line;
        }
        total
    }
}

/// One match in which a batter faced a given bowler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encounter {
    pub match_id: i64,
    pub season: String,
    pub venue: String,
    pub line: BattingLine,
}

impl Encounter {
    pub fn dismissed(&self) -> bool {
        self.line.outs > 0
    }
}

/// Batter against bowler, after season/venue filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchupStats {
    pub batter: String,
    pub bowler: String,
    pub overall: BattingLine,
    /// Only phases that cleared [`MIN_MATCHUP_PHASE_BALLS`].
    pub phases: Vec<(Phase, BattingLine)>,
    pub recent: Vec<Encounter>,
}

impl MatchupStats {
    pub fn confidence(&self) -> u8 {
        confidence_score(self.overall.balls)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchInfo {
    pub match_id: i64,
    pub season: String,
    pub venue: String,
}

/// Search hit: a player and the number of distinct matches they batted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerMatches {
    pub name: String,
    pub matches: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_saturates() {
        assert_eq!(confidence_score(0), 0);
        assert_eq!(confidence_score(1), 2);
        assert_eq!(confidence_score(25), 50);
        assert_eq!(confidence_score(49), 98);
        assert_eq!(confidence_score(50), 100);
        assert_eq!(confidence_score(100), 100);
    }

    #[test]
    fn test_confidence_monotonic() {
        let mut last = 0;
        for balls in 0..200 {
            let score = confidence_score(balls);
            assert!(score >= last);
            last = score;
        }
    }

    #[test]
    fn test_ratios_with_zero_denominators() {
        let empty = BattingLine::default();
        assert_eq!(empty.strike_rate(), 0.0);
        assert_eq!(empty.average(), None);

        let not_out = BattingLine::new(45, 30, 0);
        assert_eq!(not_out.strike_rate(), 150.0);
        assert_eq!(not_out.average(), None);
    }

    #[test]
    fn test_ratios_round_to_two_places() {
        let line = BattingLine::new(10, 3, 3);
        assert_eq!(line.strike_rate(), 333.33);
        assert_eq!(line.average(), Some(3.33));
    }

    #[test]
    fn test_reported_phases() {
        let phases = PhaseLines {
            powerplay: BattingLine::new(6, 7, 0),
            middle: BattingLine::new(12, 10, 1),
            death: BattingLine::default(),
        };
        let profile: Vec<_> = phases.reported(1).into_iter().map(|(p, _)| p).collect();
        assert_eq!(profile, vec![Phase::Powerplay, Phase::Middle]);

        let matchup: Vec<_> = phases
            .reported(MIN_MATCHUP_PHASE_BALLS)
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(matchup, vec![Phase::Middle]);
    }

    #[test]
    fn test_career_folds_seasons() {
        let season = |name: &str, runs, balls, outs, best| SeasonProfile {
            season: name.to_string(),
            matches: 2,
            line: BattingLine::new(runs, balls, outs),
            phases: PhaseLines {
                powerplay: BattingLine::new(runs, balls, outs),
                ..Default::default()
            },
            dismissals: DismissalCounts {
                caught: outs,
                ..Default::default()
            },
            highest_score: best,
        };
        let seasons = vec![season("2010", 80, 60, 2, 55), season("2011", 40, 20, 1, 40)];

        let career = CareerProfile::from_seasons("V Kohli", &seasons).unwrap();
        assert_eq!(career.matches, 4);
        assert_eq!(career.line, BattingLine::new(120, 80, 3));
        assert_eq!(career.phases.powerplay, BattingLine::new(120, 80, 3));
        assert_eq!(career.dismissals.caught, 3);
        assert_eq!(career.highest_score, Some(55));

        assert!(CareerProfile::from_seasons("nobody", &[]).is_none());
    }

    #[test]
    fn test_recent_form_summary_sums_matches() {
        let form = RecentForm {
            batter: "MS Dhoni".to_string(),
            matches: vec![
                RecentMatch {
                    match_id: 9,
                    season: "2011".to_string(),
                    venue: "Chepauk".to_string(),
                    line: BattingLine::new(30, 20, 1),
                },
                RecentMatch {
                    match_id: 7,
                    season: "2011".to_string(),
                    venue: "Chepauk".to_string(),
                    line: BattingLine::new(12, 10, 0),
                },
            ],
        };
        assert_eq!(form.summary(), BattingLine::new(42, 30, 1));
        assert!(form.matches[0].dismissed());
        assert!(!form.matches[1].dismissed());

        let empty = RecentForm {
            batter: "MS Dhoni".to_string(),
            matches: vec![],
        };
        assert_eq!(empty.summary(), BattingLine::default());
    }

    #[test]
    fn test_season_ordering() {
        let mut seasons = vec!["2009", "2007/08", "2011", "2009/10"];
        seasons.sort_by(|a, b| cmp_seasons_newest_first(a, b));
        assert_eq!(seasons, vec!["2011", "2009/10", "2009", "2007/08"]);
        assert_eq!(season_start_year("2007/08"), Some(2007));
        assert_eq!(season_start_year("unknown"), None);
    }
}
