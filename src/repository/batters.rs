//! Batter aggregates: season rows (and the career fold over them) plus recent form.
//!
//! Season rows are read from the `batter_season_agg` cache when it exists and
//! has rows for the batter; otherwise they are computed live from
//! `deliveries`. The live query is authoritative and the cache is built from
//! the same SQL, so both paths agree.

use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::QueryableByName;
use diesel_async::RunQueryDsl;

use super::pool::{DbPool, StoreError};
use crate::models::{
    cmp_seasons_newest_first, BattingLine, DismissalCounts, PhaseLines, RecentForm, RecentMatch,
    SeasonProfile,
};
use crate::with_conn;

/// Name of the precomputed per-batter, per-season aggregate table.
pub const SEASON_CACHE_TABLE: &str = "batter_season_agg";

/// Which deliveries a season aggregate covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SeasonScope {
    /// One batter (`$1`), optionally one season (`$2`).
    Batter,
    /// Every batter, keyed by lower-cased name. Used to build the cache.
    AllBatters,
}

const PHASE_FACED: &str = r#"
        COALESCE(SUM(CASE WHEN phase = 'powerplay' THEN runs_batter ELSE 0 END), 0) AS pp_runs,
        COALESCE(SUM(CASE WHEN phase = 'powerplay' AND is_legal_ball THEN 1 ELSE 0 END), 0) AS pp_balls,
        COALESCE(SUM(CASE WHEN phase = 'middle' THEN runs_batter ELSE 0 END), 0) AS mid_runs,
        COALESCE(SUM(CASE WHEN phase = 'middle' AND is_legal_ball THEN 1 ELSE 0 END), 0) AS mid_balls,
        COALESCE(SUM(CASE WHEN phase = 'death' THEN runs_batter ELSE 0 END), 0) AS death_runs,
        COALESCE(SUM(CASE WHEN phase = 'death' AND is_legal_ball THEN 1 ELSE 0 END), 0) AS death_balls"#;

const PHASE_AND_KIND_OUTS: &str = r#"
        COALESCE(SUM(CASE WHEN phase = 'powerplay' THEN 1 ELSE 0 END), 0) AS pp_outs,
        COALESCE(SUM(CASE WHEN phase = 'middle' THEN 1 ELSE 0 END), 0) AS mid_outs,
        COALESCE(SUM(CASE WHEN phase = 'death' THEN 1 ELSE 0 END), 0) AS death_outs,
        COALESCE(SUM(CASE WHEN wicket_type = 'caught' THEN 1 ELSE 0 END), 0) AS caught,
        COALESCE(SUM(CASE WHEN wicket_type = 'bowled' THEN 1 ELSE 0 END), 0) AS bowled,
        COALESCE(SUM(CASE WHEN wicket_type = 'lbw' THEN 1 ELSE 0 END), 0) AS lbw,
        COALESCE(SUM(CASE WHEN wicket_type = 'stumped' THEN 1 ELSE 0 END), 0) AS stumped"#;

const SEASON_ROW_COLUMNS: &str = r#"
    f.season AS season,
    f.matches AS matches,
    f.runs AS runs,
    f.balls AS balls,
    COALESCE(o.outs, 0) AS outs,
    f.pp_runs AS pp_runs,
    f.pp_balls AS pp_balls,
    COALESCE(o.pp_outs, 0) AS pp_outs,
    f.mid_runs AS mid_runs,
    f.mid_balls AS mid_balls,
    COALESCE(o.mid_outs, 0) AS mid_outs,
    f.death_runs AS death_runs,
    f.death_balls AS death_balls,
    COALESCE(o.death_outs, 0) AS death_outs,
    COALESCE(o.caught, 0) AS caught,
    COALESCE(o.bowled, 0) AS bowled,
    COALESCE(o.lbw, 0) AS lbw,
    COALESCE(o.stumped, 0) AS stumped,
    COALESCE(b.highest_score, 0) AS highest_score"#;

const BATTER_GROUP: &[&str] = &["season"];
const ALL_BATTERS_GROUP: &[&str] = &["batter_key", "season"];

/// SQL for per-season batting aggregates.
///
/// Outs count wickets on balls the player faced where the player was the one
/// dismissed. A run-out at the non-striker's end is not charged.
pub(crate) fn season_aggregate_sql(scope: SeasonScope) -> String {
    let (faced_key, faced_where, out_key, out_where, group_cols) = match scope {
        SeasonScope::Batter => (
            "",
            "WHERE LOWER(batter) = LOWER($1) AND ($2 IS NULL OR season = $2)",
            "",
            "WHERE is_wicket AND LOWER(batter) = LOWER($1) AND LOWER(dismissed_batter) = LOWER($1) \
             AND ($2 IS NULL OR season = $2)",
            BATTER_GROUP,
        ),
        SeasonScope::AllBatters => (
            "LOWER(batter) AS batter_key,",
            "",
            "LOWER(batter) AS batter_key,",
            "WHERE is_wicket AND LOWER(dismissed_batter) = LOWER(batter)",
            ALL_BATTERS_GROUP,
        ),
    };
    let group = group_cols.join(", ");
    let on = |alias: &str| {
        group_cols
            .iter()
            .map(|col| format!("{alias}.{col} = f.{col}"))
            .collect::<Vec<_>>()
            .join(" AND ")
    };
    let key_col = match scope {
        SeasonScope::Batter => "",
        SeasonScope::AllBatters => "f.batter_key AS batter_key,",
    };

    format!(
        r#"
        WITH faced AS (
            SELECT {faced_key}
                season,
                COUNT(DISTINCT match_id) AS matches,
                COALESCE(SUM(runs_batter), 0) AS runs,
                COALESCE(SUM(CASE WHEN is_legal_ball THEN 1 ELSE 0 END), 0) AS balls,{PHASE_FACED}
            FROM deliveries
            {faced_where}
            GROUP BY {group}
        ),
        outs AS (
            SELECT {out_key}
                season,
                COUNT(*) AS outs,{PHASE_AND_KIND_OUTS}
            FROM deliveries
            {out_where}
            GROUP BY {group}
        ),
        innings AS (
            SELECT {faced_key}
                season,
                match_id,
                SUM(runs_batter) AS runs
            FROM deliveries
            {faced_where}
            GROUP BY {group}, match_id
        ),
        best AS (
            SELECT {group}, MAX(runs) AS highest_score
            FROM innings
            GROUP BY {group}
        )
        SELECT {key_col}{SEASON_ROW_COLUMNS}
        FROM faced f
        LEFT JOIN outs o ON {outs_on}
        LEFT JOIN best b ON {best_on}
        "#,
        outs_on = on("o"),
        best_on = on("b"),
    )
}

/// One row of the season aggregate, identical for live and cached reads.
#[derive(QueryableByName, Debug, Clone, PartialEq, Eq)]
pub(crate) struct SeasonRow {
    #[diesel(sql_type = Text)]
    season: String,
    #[diesel(sql_type = BigInt)]
    matches: i64,
    #[diesel(sql_type = BigInt)]
    runs: i64,
    #[diesel(sql_type = BigInt)]
    balls: i64,
    #[diesel(sql_type = BigInt)]
    outs: i64,
    #[diesel(sql_type = BigInt)]
    pp_runs: i64,
    #[diesel(sql_type = BigInt)]
    pp_balls: i64,
    #[diesel(sql_type = BigInt)]
    pp_outs: i64,
    #[diesel(sql_type = BigInt)]
    mid_runs: i64,
    #[diesel(sql_type = BigInt)]
    mid_balls: i64,
    #[diesel(sql_type = BigInt)]
    mid_outs: i64,
    #[diesel(sql_type = BigInt)]
    death_runs: i64,
    #[diesel(sql_type = BigInt)]
    death_balls: i64,
    #[diesel(sql_type = BigInt)]
    death_outs: i64,
    #[diesel(sql_type = BigInt)]
    caught: i64,
    #[diesel(sql_type = BigInt)]
    bowled: i64,
    #[diesel(sql_type = BigInt)]
    lbw: i64,
    #[diesel(sql_type = BigInt)]
    stumped: i64,
    #[diesel(sql_type = BigInt)]
    highest_score: i64,
}

impl From<SeasonRow> for SeasonProfile {
    fn from(row: SeasonRow) -> Self {
        SeasonProfile {
            season: row.season,
            matches: row.matches,
            line: BattingLine::new(row.runs, row.balls, row.outs),
            phases: PhaseLines {
                powerplay: BattingLine::new(row.pp_runs, row.pp_balls, row.pp_outs),
                middle: BattingLine::new(row.mid_runs, row.mid_balls, row.mid_outs),
                death: BattingLine::new(row.death_runs, row.death_balls, row.death_outs),
            },
            dismissals: DismissalCounts {
                caught: row.caught,
                bowled: row.bowled,
                lbw: row.lbw,
                stumped: row.stumped,
            },
            highest_score: row.highest_score,
        }
    }
}

#[derive(QueryableByName)]
struct RecentMatchRow {
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

/// Oldest season first.
fn sort_seasons(mut seasons: Vec<SeasonProfile>) -> Vec<SeasonProfile> {
    seasons.sort_by(|a, b| cmp_seasons_newest_first(&b.season, &a.season));
    seasons
}

#[derive(Clone)]
pub struct BatterRepository {
    pool: DbPool,
}

impl BatterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Per-season aggregates for a batter, oldest season first.
    ///
    /// Reads the aggregate cache when it has rows; otherwise computes live.
    pub async fn season_profiles(
        &self,
        batter: &str,
        season: Option<&str>,
    ) -> Result<Vec<SeasonProfile>, StoreError> {
        match self.cached_season_profiles(batter, season).await {
            Ok(rows) if !rows.is_empty() => return Ok(rows),
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("aggregate cache unavailable, computing live: {}", e);
            }
        }
        self.live_season_profiles(batter, season).await
    }

    /// Per-season aggregates computed directly from `deliveries`.
    pub async fn live_season_profiles(
        &self,
        batter: &str,
        season: Option<&str>,
    ) -> Result<Vec<SeasonProfile>, StoreError> {
        let sql = season_aggregate_sql(SeasonScope::Batter);
        let rows: Vec<SeasonRow> = with_conn!(self.pool, conn => {
            diesel::sql_query(sql)
                .bind::<Text, _>(batter)
                .bind::<Nullable<Text>, _>(season)
                .load(conn)
                .await?
        });
        Ok(sort_seasons(rows.into_iter().map(SeasonProfile::from).collect()))
    }

    /// Per-season aggregates from the cache table. Errors if it doesn't exist.
    pub async fn cached_season_profiles(
        &self,
        batter: &str,
        season: Option<&str>,
    ) -> Result<Vec<SeasonProfile>, StoreError> {
        let sql = format!(
            r#"
            SELECT season, matches, runs, balls, outs,
                   pp_runs, pp_balls, pp_outs,
                   mid_runs, mid_balls, mid_outs,
                   death_runs, death_balls, death_outs,
                   caught, bowled, lbw, stumped, highest_score
            FROM {SEASON_CACHE_TABLE}
            WHERE batter_key = LOWER($1) AND ($2 IS NULL OR season = $2)
            "#
        );
        let rows: Vec<SeasonRow> = with_conn!(self.pool, conn => {
            diesel::sql_query(sql)
                .bind::<Text, _>(batter)
                .bind::<Nullable<Text>, _>(season)
                .load(conn)
                .await?
        });
        Ok(sort_seasons(rows.into_iter().map(SeasonProfile::from).collect()))
    }

    /// The batter's `limit` most recent matches (highest match_id first).
    ///
    /// Runs, balls and the dismissal all come from deliveries the batter faced.
    pub async fn recent_form(
        &self,
        batter: &str,
        limit: i64,
        season: Option<&str>,
    ) -> Result<RecentForm, StoreError> {
        let rows: Vec<RecentMatchRow> = with_conn!(self.pool, conn => {
            diesel::sql_query(
                r#"
                WITH recent AS (
                    SELECT match_id
                    FROM deliveries
                    WHERE LOWER(batter) = LOWER($1) AND ($2 IS NULL OR season = $2)
                    GROUP BY match_id
                    ORDER BY match_id DESC
                    LIMIT $3
                )
                SELECT d.match_id AS match_id,
                       MAX(d.season) AS season,
                       MAX(d.venue) AS venue,
                       COALESCE(SUM(CASE WHEN LOWER(d.batter) = LOWER($1)
                                    THEN d.runs_batter ELSE 0 END), 0) AS runs,
                       COALESCE(SUM(CASE WHEN LOWER(d.batter) = LOWER($1) AND d.is_legal_ball
                                    THEN 1 ELSE 0 END), 0) AS balls,
                       COALESCE(SUM(CASE WHEN d.is_wicket AND LOWER(d.batter) = LOWER($1)
                                        AND LOWER(d.dismissed_batter) = LOWER($1)
                                    THEN 1 ELSE 0 END), 0) AS outs
                FROM deliveries d
                JOIN recent r ON r.match_id = d.match_id
                GROUP BY d.match_id
                ORDER BY d.match_id DESC
                "#,
            )
            .bind::<Text, _>(batter)
            .bind::<Nullable<Text>, _>(season)
            .bind::<BigInt, _>(limit)
            .load(conn)
            .await?
        });

        Ok(RecentForm {
            batter: batter.to_string(),
            matches: rows
                .into_iter()
                .map(|row| RecentMatch {
                    match_id: row.match_id,
                    season: row.season,
                    venue: row.venue,
                    line: BattingLine::new(row.runs, row.balls, row.outs),
                })
                .collect(),
        })
    }
}
