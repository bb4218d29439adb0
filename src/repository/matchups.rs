//! Batter-versus-bowler aggregates.

use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::QueryableByName;
use diesel_async::RunQueryDsl;

use super::pool::{DbPool, StoreError};
use crate::models::{BattingLine, Encounter, MatchupStats, Phase, MIN_MATCHUP_PHASE_BALLS};
use crate::with_conn;

/// Number of recent encounters reported per matchup.
pub const RECENT_ENCOUNTERS: i64 = 5;

/// Filter shared by every matchup query: `$1` batter, `$2` bowler,
/// `$3` optional season, `$4` optional venue.
const MATCHUP_FILTER: &str = "LOWER(batter) = LOWER($1) \
     AND LOWER(bowler) = LOWER($2) \
     AND ($3 IS NULL OR season = $3) \
     AND ($4 IS NULL OR venue = $4)";

const LINE_COLUMNS: &str = "COALESCE(SUM(runs_batter), 0) AS runs, \
     COALESCE(SUM(CASE WHEN is_legal_ball THEN 1 ELSE 0 END), 0) AS balls, \
     COALESCE(SUM(CASE WHEN is_wicket AND LOWER(dismissed_batter) = LOWER($1) THEN 1 ELSE 0 END), 0) AS outs";

/// Inputs to a matchup lookup.
#[derive(Debug, Clone, Default)]
pub struct MatchupQuery {
    pub batter: String,
    pub bowler: String,
    pub season: Option<String>,
    pub venue: Option<String>,
    pub include_phases: bool,
}

#[derive(QueryableByName)]
struct LineRow {
    #[diesel(sql_type = BigInt)]
    runs: i64,
    #[diesel(sql_type = BigInt)]
    balls: i64,
    #[diesel(sql_type = BigInt)]
    outs: i64,
}

impl From<&LineRow> for BattingLine {
    fn from(row: &LineRow) -> Self {
        BattingLine::new(row.runs, row.balls, row.outs)
    }
}

#[derive(QueryableByName)]
struct PhaseRow {
    #[diesel(sql_type = Text)]
    phase: String,
    #[diesel(sql_type = BigInt)]
    runs: i64,
    #[diesel(sql_type = BigInt)]
    balls: i64,
    #[diesel(sql_type = BigInt)]
    outs: i64,
}

#[derive(QueryableByName)]
struct EncounterRow {
    #[diesel(sql_type = BigInt)]
    match_id: i64,
    #[diesel(sql_type = Text)]
    season: String,
    #[diesel(sql_type = Text)]
    venue: String,
    #[diesel(sql_type = BigInt)]
    runs: i64,
    #[diesel(sql_type = BigInt)]
    balls: i64,
    #[diesel(sql_type = BigInt)]
    outs: i64,
}

/// Keep phases with enough legal balls to mean something, in match order.
fn significant_phases(rows: Vec<PhaseRow>) -> Vec<(Phase, BattingLine)> {
    let mut phases: Vec<(Phase, BattingLine)> = rows
        .into_iter()
        .filter(|row| row.balls >= MIN_MATCHUP_PHASE_BALLS)
        .filter_map(|row| {
            Phase::from_str(&row.phase)
                .map(|phase| (phase, BattingLine::new(row.runs, row.balls, row.outs)))
        })
        .collect();
    phases.sort_by_key(|(phase, _)| *phase);
    phases
}

#[derive(Clone)]
pub struct MatchupRepository {
    pool: DbPool,
}

impl MatchupRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Overall line, phase split and recent encounters for a matchup.
    ///
    /// Returns `None` when the filtered deliveries contain no legal balls.
    pub async fn matchup(&self, query: &MatchupQuery) -> Result<Option<MatchupStats>, StoreError> {
        let season = query.season.as_deref();
        let venue = query.venue.as_deref();

        let overall_sql = format!("SELECT {LINE_COLUMNS} FROM deliveries WHERE {MATCHUP_FILTER}");
        let phase_sql = format!(
            "SELECT phase, {LINE_COLUMNS} FROM deliveries WHERE {MATCHUP_FILTER} GROUP BY phase"
        );
        // $5 comes last so SQLite numbers it after the filter parameters
        let recent_sql = format!(
            "SELECT match_id, MAX(season) AS season, MAX(venue) AS venue, {LINE_COLUMNS} \
             FROM deliveries WHERE {MATCHUP_FILTER} \
             GROUP BY match_id ORDER BY match_id DESC LIMIT $5"
        );

        with_conn!(self.pool, conn => {
            let overall: Vec<LineRow> = diesel::sql_query(overall_sql)
                .bind::<Text, _>(&query.batter)
                .bind::<Text, _>(&query.bowler)
                .bind::<Nullable<Text>, _>(season)
                .bind::<Nullable<Text>, _>(venue)
                .load(conn)
                .await?;
            let overall = overall.iter().next().map(BattingLine::from).unwrap_or_default();
            if overall.balls == 0 {
                return Ok(None);
            }

            let phases = if query.include_phases {
                let rows: Vec<PhaseRow> = diesel::sql_query(phase_sql)
                    .bind::<Text, _>(&query.batter)
                    .bind::<Text, _>(&query.bowler)
                    .bind::<Nullable<Text>, _>(season)
                    .bind::<Nullable<Text>, _>(venue)
                    .load(conn)
                    .await?;
                significant_phases(rows)
            } else {
                Vec::new()
            };

            let recent: Vec<EncounterRow> = diesel::sql_query(recent_sql)
                .bind::<Text, _>(&query.batter)
                .bind::<Text, _>(&query.bowler)
                .bind::<Nullable<Text>, _>(season)
                .bind::<Nullable<Text>, _>(venue)
                .bind::<BigInt, _>(RECENT_ENCOUNTERS)
                .load(conn)
                .await?;

            Ok(Some(MatchupStats {
                batter: query.batter.clone(),
                bowler: query.bowler.clone(),
                overall,
                phases,
                recent: recent
                    .into_iter()
                    .map(|row| Encounter {
                        match_id: row.match_id,
                        season: row.season,
                        venue: row.venue,
                        line: BattingLine::new(row.runs, row.balls, row.outs),
                    })
                    .collect(),
            }))
        })
    }
}
