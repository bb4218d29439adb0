//! Serde model of a Cricsheet match file (only the fields ingestion reads).

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct RawMatch {
    pub info: RawInfo,
    #[serde(default)]
    pub innings: Vec<RawInnings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInfo {
    #[serde(deserialize_with = "season_label")]
    pub season: String,
    pub venue: String,
    #[serde(default)]
    pub event: Option<RawEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub match_number: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInnings {
    pub team: String,
    #[serde(default)]
    pub overs: Vec<RawOver>,
    #[serde(default)]
    pub super_over: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOver {
    pub over: i32,
    pub deliveries: Vec<RawDelivery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDelivery {
    pub batter: String,
    pub bowler: String,
    pub non_striker: String,
    pub runs: RawRuns,
    /// Extras kinds in file order (e.g. `{"wides": 1}`).
    #[serde(default)]
    pub extras: Map<String, Value>,
    #[serde(default)]
    pub wickets: Vec<RawWicket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRuns {
    pub batter: i32,
    pub extras: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawWicket {
    pub player_out: String,
    pub kind: String,
}

impl RawMatch {
    pub fn match_number(&self) -> Option<i64> {
        self.info.event.as_ref().and_then(|e| e.match_number)
    }
}

/// Seasons appear both as strings ("2007/08") and bare numbers (2011).
fn season_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected season as string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_accepts_string_or_number() {
        let a: RawInfo = serde_json::from_str(r#"{"season": "2007/08", "venue": "Eden Gardens"}"#)
            .unwrap();
        assert_eq!(a.season, "2007/08");

        let b: RawInfo =
            serde_json::from_str(r#"{"season": 2011, "venue": "Wankhede Stadium"}"#).unwrap();
        assert_eq!(b.season, "2011");

        assert!(serde_json::from_str::<RawInfo>(r#"{"season": true, "venue": "x"}"#).is_err());
    }

    #[test]
    fn test_extras_keep_file_order() {
        let d: RawDelivery = serde_json::from_str(
            r#"{"batter": "A", "bowler": "B", "non_striker": "C",
                "runs": {"batter": 0, "extras": 2, "total": 2},
                "extras": {"noballs": 1, "byes": 1}}"#,
        )
        .unwrap();
        let kinds: Vec<&str> = d.extras.keys().map(String::as_str).collect();
        assert_eq!(kinds, vec!["noballs", "byes"]);
    }

    #[test]
    fn test_missing_required_field_fails() {
        let result = serde_json::from_str::<RawDelivery>(
            r#"{"batter": "A", "non_striker": "C", "runs": {"batter": 0, "extras": 0}}"#,
        );
        assert!(result.is_err());
    }
}
