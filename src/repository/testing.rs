//! Fixtures shared by store, service and router tests.

use tempfile::TempDir;

use super::{DbContext, PoolOptions};
use crate::models::{Delivery, Phase};

pub(crate) const PARTNER: &str = "AB de Villiers";

/// A migrated SQLite store in a temporary directory.
pub(crate) struct TestStore {
    pub ctx: DbContext,
    _dir: TempDir,
}

pub(crate) async fn test_store() -> TestStore {
    let dir = tempfile::tempdir().unwrap();
    let url = dir.path().join("ipl.db").display().to_string();
    let ctx = DbContext::from_url(&url, PoolOptions::default()).unwrap();
    ctx.init_schema().await.unwrap();
    TestStore { ctx, _dir: dir }
}

/// Builds one match's deliveries ball by ball.
pub(crate) struct MatchBuilder {
    match_id: i64,
    season: String,
    venue: String,
    innings: i32,
    seq: i32,
    over: i32,
    ball: i32,
    deliveries: Vec<Delivery>,
}

impl MatchBuilder {
    pub fn new(match_id: i64, season: &str, venue: &str) -> Self {
        Self {
            match_id,
            season: season.to_string(),
            venue: venue.to_string(),
            innings: 1,
            seq: 0,
            over: 0,
            ball: 0,
            deliveries: Vec::new(),
        }
    }

    pub fn innings(mut self, innings: i32) -> Self {
        self.innings = innings;
        self.seq = 0;
        self
    }

    pub fn over(mut self, over: i32) -> Self {
        self.over = over;
        self.ball = 0;
        self
    }

    pub fn runs(self, batter: &str, bowler: &str, runs: i32) -> Self {
        self.push(batter, bowler, runs, None, None)
    }

    pub fn dots(mut self, batter: &str, bowler: &str, count: usize) -> Self {
        for _ in 0..count {
            self = self.runs(batter, bowler, 0);
        }
        self
    }

    pub fn wide(self, batter: &str, bowler: &str) -> Self {
        self.push(batter, bowler, 0, Some("wides"), None)
    }

    pub fn out(self, batter: &str, bowler: &str, kind: &str) -> Self {
        self.push(batter, bowler, 0, None, Some((batter, kind)))
    }

    /// The non-striker is run out while `batter` is on strike.
    pub fn partner_run_out(self, batter: &str, bowler: &str) -> Self {
        self.push(batter, bowler, 0, None, Some((PARTNER, "run out")))
    }

    pub fn build(self) -> Vec<Delivery> {
        self.deliveries
    }

    fn push(
        mut self,
        batter: &str,
        bowler: &str,
        runs_batter: i32,
        extras: Option<&str>,
        wicket: Option<(&str, &str)>,
    ) -> Self {
        let is_legal_ball = Delivery::is_legal(extras.into_iter());
        self.seq += 1;
        if is_legal_ball {
            self.ball += 1;
        }
        self.deliveries.push(Delivery {
            match_id: self.match_id,
            innings: self.innings,
            delivery_seq: self.seq,
            season: self.season.clone(),
            venue: self.venue.clone(),
            over: self.over,
            ball: self.ball,
            batting_team: "Royal Challengers Bangalore".to_string(),
            batter: batter.to_string(),
            bowler: bowler.to_string(),
            non_striker: PARTNER.to_string(),
            runs_batter,
            runs_extras: i32::from(extras.is_some()),
            extras_type: extras.map(str::to_string),
            is_legal_ball,
            is_wicket: wicket.is_some(),
            dismissed_batter: wicket.map(|(player, _)| player.to_string()),
            wicket_type: wicket.map(|(_, kind)| kind.to_string()),
            phase: Phase::from_over(self.over),
        });
        self
    }
}

pub(crate) const KOHLI: &str = "V Kohli";
pub(crate) const STEYN: &str = "DW Steyn";
pub(crate) const MISHRA: &str = "A Mishra";
pub(crate) const DHONI: &str = "MS Dhoni";

/// Three matches over two seasons.
///
/// V Kohli: 27 runs off 11 legal balls, out twice (caught, bowled), highest 12.
/// Against DW Steyn: 22 off 7, out once, in matches 100 and 200.
pub(crate) fn sample_matches() -> Vec<Vec<Delivery>> {
    vec![
        MatchBuilder::new(100, "2008", "Eden Gardens")
            .over(0)
            .runs(KOHLI, STEYN, 4)
            .runs(KOHLI, STEYN, 0)
            .wide(KOHLI, STEYN)
            .runs(KOHLI, STEYN, 6)
            .over(7)
            .runs(KOHLI, MISHRA, 1)
            .out(KOHLI, MISHRA, "caught")
            .build(),
        MatchBuilder::new(200, "2009", "Wankhede Stadium")
            .over(16)
            .runs(KOHLI, STEYN, 6)
            .runs(KOHLI, STEYN, 6)
            .runs(KOHLI, STEYN, 0)
            .out(KOHLI, STEYN, "bowled")
            .build(),
        MatchBuilder::new(300, "2009", "Eden Gardens")
            .over(2)
            .runs(KOHLI, MISHRA, 2)
            .runs(KOHLI, MISHRA, 2)
            .over(3)
            .runs(DHONI, MISHRA, 1)
            .build(),
    ]
}

pub(crate) async fn seeded_store() -> TestStore {
    let store = test_store().await;
    for deliveries in sample_matches() {
        store.ctx.deliveries().store_match(&deliveries).await.unwrap();
    }
    store
}
