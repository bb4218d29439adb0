//! Diesel records for the delivery store tables.

use diesel::prelude::*;

use crate::models::{Delivery, MatchInfo, Phase};
use crate::schema;

/// Match record from the database.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::matches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MatchRecord {
    pub match_id: i64,
    pub season: String,
    pub venue: String,
}

impl From<MatchRecord> for MatchInfo {
    fn from(record: MatchRecord) -> Self {
        MatchInfo {
            match_id: record.match_id,
            season: record.season,
            venue: record.venue,
        }
    }
}

/// Delivery record from the database.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::deliveries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DeliveryRecord {
    pub match_id: i64,
    pub innings: i32,
    pub delivery_seq: i32,
    pub season: String,
    pub venue: String,
    pub over_number: i32,
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
    pub phase: String,
}

impl From<DeliveryRecord> for Delivery {
    fn from(record: DeliveryRecord) -> Self {
        Delivery {
            match_id: record.match_id,
            innings: record.innings,
            delivery_seq: record.delivery_seq,
            season: record.season,
            venue: record.venue,
            over: record.over_number,
            ball: record.ball,
            batting_team: record.batting_team,
            batter: record.batter,
            bowler: record.bowler,
            non_striker: record.non_striker,
            runs_batter: record.runs_batter,
            runs_extras: record.runs_extras,
            extras_type: record.extras_type,
            is_legal_ball: record.is_legal_ball,
            is_wicket: record.is_wicket,
            dismissed_batter: record.dismissed_batter,
            wicket_type: record.wicket_type,
            // unknown labels fall back to the over number
            phase: Phase::from_str(&record.phase)
                .unwrap_or_else(|| Phase::from_over(record.over_number)),
        }
    }
}

/// New player for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::players)]
pub struct NewPlayer<'a> {
    pub player_name: &'a str,
}

/// New match for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::matches)]
pub struct NewMatch<'a> {
    pub match_id: i64,
    pub season: &'a str,
    pub venue: &'a str,
}

/// New delivery for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::deliveries)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewDelivery<'a> {
    pub match_id: i64,
    pub innings: i32,
    pub delivery_seq: i32,
    pub season: &'a str,
    pub venue: &'a str,
    pub over_number: i32,
    pub ball: i32,
    pub batting_team: &'a str,
    pub batter: &'a str,
    pub bowler: &'a str,
    pub non_striker: &'a str,
    pub runs_batter: i32,
    pub runs_extras: i32,
    pub extras_type: Option<&'a str>,
    pub is_legal_ball: bool,
    pub is_wicket: bool,
    pub dismissed_batter: Option<&'a str>,
    pub wicket_type: Option<&'a str>,
    pub phase: &'a str,
}

impl<'a> From<&'a Delivery> for NewDelivery<'a> {
    fn from(d: &'a Delivery) -> Self {
        NewDelivery {
            match_id: d.match_id,
            innings: d.innings,
            delivery_seq: d.delivery_seq,
            season: &d.season,
            venue: &d.venue,
            over_number: d.over,
            ball: d.ball,
            batting_team: &d.batting_team,
            batter: &d.batter,
            bowler: &d.bowler,
            non_striker: &d.non_striker,
            runs_batter: d.runs_batter,
            runs_extras: d.runs_extras,
            extras_type: d.extras_type.as_deref(),
            is_legal_ball: d.is_legal_ball,
            is_wicket: d.is_wicket,
            dismissed_batter: d.dismissed_batter.as_deref(),
            wicket_type: d.wicket_type.as_deref(),
            phase: d.phase.as_str(),
        }
    }
}
