use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::models::Delivery;

pub const MAX_WICKETS: i64 = 10;
/// Twenty six-ball overs.
pub const MAX_LEGAL_BALLS: i64 = 120;

/// Per-innings totals gathered while validating a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InningsSummary {
    pub innings: i32,
    pub runs: i64,
    pub wickets: i64,
    pub legal_balls: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    TooManyWickets(i64),
    TooManyLegalBalls(i64),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyWickets(n) => write!(f, "{n} wickets (max {MAX_WICKETS})"),
            Self::TooManyLegalBalls(n) => write!(f, "{n} legal balls (max {MAX_LEGAL_BALLS})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("innings {innings} has {violation}")]
pub struct ValidationError {
    pub innings: i32,
    pub violation: Violation,
}

/// Check every innings against the wicket and legal-ball limits.
///
/// Returns the per-innings totals in innings order when all limits hold.
pub fn validate(deliveries: &[Delivery]) -> Result<Vec<InningsSummary>, ValidationError> {
    let mut by_innings: BTreeMap<i32, InningsSummary> = BTreeMap::new();

    for d in deliveries {
        let summary = by_innings.entry(d.innings).or_insert_with(|| InningsSummary {
            innings: d.innings,
            ..Default::default()
        });
        summary.runs += i64::from(d.total_runs());
        if d.is_wicket {
            summary.wickets += 1;
        }
        if d.is_legal_ball {
            summary.legal_balls += 1;
        }
    }

    for summary in by_innings.values() {
        if summary.wickets > MAX_WICKETS {
            return Err(ValidationError {
                innings: summary.innings,
                violation: Violation::TooManyWickets(summary.wickets),
            });
        }
        if summary.legal_balls > MAX_LEGAL_BALLS {
            return Err(ValidationError {
                innings: summary.innings,
                violation: Violation::TooManyLegalBalls(summary.legal_balls),
            });
        }
    }

    Ok(by_innings.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Phase;

    fn ball(innings: i32, seq: i32, legal: bool, wicket: bool, runs: i32) -> Delivery {
        let over = (seq - 1) / 6;
        Delivery {
            match_id: 1,
            innings,
            delivery_seq: seq,
            season: "2011".into(),
            venue: "Wankhede Stadium".into(),
            over,
            ball: (seq - 1) % 6 + 1,
            batting_team: "Mumbai Indians".into(),
            batter: "SR Tendulkar".into(),
            bowler: "DW Steyn".into(),
            non_striker: "AT Rayudu".into(),
            runs_batter: runs,
            runs_extras: if legal { 0 } else { 1 },
            extras_type: (!legal).then(|| "wides".to_string()),
            is_legal_ball: legal,
            is_wicket: wicket,
            dismissed_batter: wicket.then(|| "SR Tendulkar".to_string()),
            wicket_type: wicket.then(|| "caught".to_string()),
            phase: Phase::from_over(over),
        }
    }

    fn innings(n: i32, legal_balls: i32, wickets: i32) -> Vec<Delivery> {
        (1..=legal_balls)
            .map(|seq| ball(n, seq, true, seq <= wickets, 1))
            .collect()
    }

    #[test]
    fn test_full_match_passes() {
        let mut deliveries = innings(1, 120, 6);
        deliveries.extend(innings(2, 120, 4));
        deliveries.push(ball(2, 121, false, false, 0));

        let summaries = validate(&deliveries).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(
            summaries[0],
            InningsSummary { innings: 1, runs: 120, wickets: 6, legal_balls: 120 }
        );
        assert_eq!(summaries[1].legal_balls, 120);
        assert_eq!(summaries[1].runs, 121);
    }

    #[test]
    fn test_ten_wickets_allowed_eleven_rejected() {
        assert!(validate(&innings(1, 60, 10)).is_ok());

        let err = validate(&innings(1, 60, 11)).unwrap_err();
        assert_eq!(err.innings, 1);
        assert_eq!(err.violation, Violation::TooManyWickets(11));
        assert_eq!(err.to_string(), "innings 1 has 11 wickets (max 10)");
    }

    #[test]
    fn test_too_many_legal_balls_rejected() {
        let mut deliveries = innings(1, 100, 0);
        deliveries.extend(innings(2, 121, 0));
        let err = validate(&deliveries).unwrap_err();
        assert_eq!(err.innings, 2);
        assert_eq!(err.violation, Violation::TooManyLegalBalls(121));
    }

    #[test]
    fn test_illegal_balls_do_not_count() {
        let mut deliveries = innings(1, 120, 0);
        deliveries.extend((121..=130).map(|seq| ball(1, seq, false, false, 0)));
        assert!(validate(&deliveries).is_ok());
    }

    #[test]
    fn test_empty_is_valid() {
        assert!(validate(&[]).unwrap().is_empty());
    }
}
