use std::path::Path;

use tracing::warn;

use super::raw::RawMatch;
use super::IngestError;
use crate::models::{Delivery, Phase};

/// Read and parse one match file into deliveries.
pub fn read_match_file(path: &Path) -> Result<Vec<Delivery>, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawMatch = serde_json::from_slice(&bytes).map_err(|source| IngestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let match_id = match_id_for(path, &raw)?;
    Ok(parse_match(&raw, match_id))
}

/// Cricsheet names files after the match id; fall back to the event's match number.
pub fn match_id_for(path: &Path, raw: &RawMatch) -> Result<i64, IngestError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.parse::<i64>().ok())
        .or_else(|| raw.match_number())
        .ok_or_else(|| IngestError::MissingMatchId(path.to_path_buf()))
}

/// Flatten a match into deliveries in file order.
///
/// Super-over innings are skipped. `delivery_seq` counts every delivery in an
/// innings from 1; `ball` counts legal deliveries within the current over, so a
/// wide keeps the number of the last legal ball.
pub fn parse_match(raw: &RawMatch, match_id: i64) -> Vec<Delivery> {
    let mut deliveries = Vec::new();

    let regulation = raw.innings.iter().filter(|innings| !innings.super_over);
    for (index, innings) in regulation.enumerate() {
        let innings_number = index as i32 + 1;
        let mut delivery_seq = 0;

        for over in &innings.overs {
            let mut ball = 0;
            let phase = Phase::from_over(over.over);

            for raw_delivery in &over.deliveries {
                delivery_seq += 1;

                let is_legal_ball = Delivery::is_legal(raw_delivery.extras.keys().map(String::as_str));
                if is_legal_ball {
                    ball += 1;
                }

                if raw_delivery.wickets.len() > 1 {
                    warn!(
                        match_id,
                        innings = innings_number,
                        over = over.over,
                        delivery_seq,
                        wickets = raw_delivery.wickets.len(),
                        "Delivery has several wickets; only the first is recorded"
                    );
                }
                let wicket = raw_delivery.wickets.first();

                deliveries.push(Delivery {
                    match_id,
                    innings: innings_number,
                    delivery_seq,
                    season: raw.info.season.clone(),
                    venue: raw.info.venue.clone(),
                    over: over.over,
                    ball,
                    batting_team: innings.team.clone(),
                    batter: raw_delivery.batter.clone(),
                    bowler: raw_delivery.bowler.clone(),
                    non_striker: raw_delivery.non_striker.clone(),
                    runs_batter: raw_delivery.runs.batter,
                    runs_extras: raw_delivery.runs.extras,
                    extras_type: raw_delivery.extras.keys().next().cloned(),
                    is_legal_ball,
                    is_wicket: wicket.is_some(),
                    dismissed_batter: wicket.map(|w| w.player_out.clone()),
                    wicket_type: wicket.map(|w| w.kind.clone()),
                    phase,
                });
            }
        }
    }

    deliveries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn raw(value: serde_json::Value) -> RawMatch {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> RawMatch {
        raw(json!({
            "info": {
                "season": "2007/08",
                "venue": "M Chinnaswamy Stadium",
                "event": {"name": "Indian Premier League", "match_number": 1}
            },
            "innings": [
                {
                    "team": "Kolkata Knight Riders",
                    "overs": [
                        {"over": 0, "deliveries": [
                            {"batter": "SC Ganguly", "bowler": "P Kumar", "non_striker": "BB McCullum",
                             "runs": {"batter": 0, "extras": 1, "total": 1}, "extras": {"legbyes": 1}},
                            {"batter": "BB McCullum", "bowler": "P Kumar", "non_striker": "SC Ganguly",
                             "runs": {"batter": 0, "extras": 1, "total": 1}, "extras": {"wides": 1}},
                            {"batter": "BB McCullum", "bowler": "P Kumar", "non_striker": "SC Ganguly",
                             "runs": {"batter": 4, "extras": 0, "total": 4}}
                        ]},
                        {"over": 6, "deliveries": [
                            {"batter": "SC Ganguly", "bowler": "Z Khan", "non_striker": "BB McCullum",
                             "runs": {"batter": 0, "extras": 0, "total": 0},
                             "wickets": [{"player_out": "SC Ganguly", "kind": "bowled"}]}
                        ]}
                    ]
                },
                {
                    "team": "Royal Challengers Bangalore",
                    "overs": [
                        {"over": 16, "deliveries": [
                            {"batter": "R Dravid", "bowler": "AB Agarkar", "non_striker": "W Jaffer",
                             "runs": {"batter": 1, "extras": 1, "total": 2}, "extras": {"noballs": 1}},
                            {"batter": "W Jaffer", "bowler": "AB Agarkar", "non_striker": "R Dravid",
                             "runs": {"batter": 6, "extras": 0, "total": 6}}
                        ]}
                    ]
                },
                {
                    "team": "Kolkata Knight Riders",
                    "super_over": true,
                    "overs": [
                        {"over": 0, "deliveries": [
                            {"batter": "SC Ganguly", "bowler": "Z Khan", "non_striker": "BB McCullum",
                             "runs": {"batter": 6, "extras": 0, "total": 6}}
                        ]}
                    ]
                }
            ]
        }))
    }

    #[test]
    fn test_sequence_and_ball_counters() {
        let deliveries = parse_match(&sample(), 335982);
        assert_eq!(deliveries.len(), 6);

        let first: Vec<(i32, i32, i32)> = deliveries
            .iter()
            .filter(|d| d.innings == 1)
            .map(|d| (d.delivery_seq, d.over, d.ball))
            .collect();
        assert_eq!(first, vec![(1, 0, 1), (2, 0, 1), (3, 0, 2), (4, 6, 1)]);

        let second: Vec<(i32, i32)> = deliveries
            .iter()
            .filter(|d| d.innings == 2)
            .map(|d| (d.delivery_seq, d.ball))
            .collect();
        assert_eq!(second, vec![(1, 0), (2, 1)]);
    }

    #[test]
    fn test_legality_and_extras_type() {
        let deliveries = parse_match(&sample(), 1);
        let legal: Vec<bool> = deliveries.iter().map(|d| d.is_legal_ball).collect();
        assert_eq!(legal, vec![true, false, true, true, false, true]);
        assert_eq!(deliveries[0].extras_type.as_deref(), Some("legbyes"));
        assert_eq!(deliveries[1].extras_type.as_deref(), Some("wides"));
        assert_eq!(deliveries[2].extras_type, None);
        assert_eq!(deliveries[4].extras_type.as_deref(), Some("noballs"));
        assert_eq!(deliveries[4].total_runs(), 2);
    }

    #[test]
    fn test_phase_and_metadata() {
        let deliveries = parse_match(&sample(), 7);
        let phases: Vec<Phase> = deliveries.iter().map(|d| d.phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Powerplay,
                Phase::Powerplay,
                Phase::Powerplay,
                Phase::Middle,
                Phase::Death,
                Phase::Death
            ]
        );
        assert!(deliveries.iter().all(|d| d.match_id == 7));
        assert!(deliveries.iter().all(|d| d.season == "2007/08"));
        assert_eq!(deliveries[4].batting_team, "Royal Challengers Bangalore");
    }

    #[test]
    fn test_wicket_fields() {
        let deliveries = parse_match(&sample(), 1);
        let wicket = &deliveries[3];
        assert!(wicket.is_wicket);
        assert_eq!(wicket.dismissed_batter.as_deref(), Some("SC Ganguly"));
        assert_eq!(wicket.wicket_type.as_deref(), Some("bowled"));
        assert!(deliveries
            .iter()
            .filter(|d| !d.is_wicket)
            .all(|d| d.dismissed_batter.is_none() && d.wicket_type.is_none()));
    }

    #[test]
    fn test_first_of_multiple_wickets_is_kept() {
        let m = raw(json!({
            "info": {"season": 2020, "venue": "Dubai International Cricket Stadium"},
            "innings": [{"team": "A", "overs": [{"over": 19, "deliveries": [
                {"batter": "X", "bowler": "Y", "non_striker": "Z",
                 "runs": {"batter": 0, "extras": 0},
                 "wickets": [{"player_out": "Z", "kind": "run out"},
                             {"player_out": "X", "kind": "retired hurt"}]}
            ]}]}]
        }));
        let deliveries = parse_match(&m, 1);
        assert_eq!(deliveries[0].dismissed_batter.as_deref(), Some("Z"));
        assert_eq!(deliveries[0].wicket_type.as_deref(), Some("run out"));
        assert_eq!(deliveries[0].season, "2020");
    }

    #[test]
    fn test_match_id_prefers_numeric_stem() {
        let m = sample();
        assert_eq!(match_id_for(&PathBuf::from("data/335982.json"), &m).unwrap(), 335982);
        assert_eq!(match_id_for(&PathBuf::from("data/opening.json"), &m).unwrap(), 1);

        let no_event = raw(json!({"info": {"season": "2011", "venue": "V"}, "innings": []}));
        assert!(matches!(
            match_id_for(&PathBuf::from("opening.json"), &no_event),
            Err(IngestError::MissingMatchId(_))
        ));
    }

    #[test]
    fn test_read_match_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.json");
        std::fs::write(&path, r#"{"info": {"season": "2011"}}"#).unwrap();
        assert!(matches!(read_match_file(&path), Err(IngestError::Parse { .. })));

        let missing = dir.path().join("2.json");
        assert!(matches!(read_match_file(&missing), Err(IngestError::Io { .. })));
    }
}
