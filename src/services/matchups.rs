use serde_json::json;

use super::{resolve_player, ServiceError};
use crate::models::MatchupStats;
use crate::repository::{DbContext, MatchupQuery};

#[derive(Clone)]
pub struct MatchupService {
    ctx: DbContext,
}

impl MatchupService {
    pub fn new(ctx: DbContext) -> Self {
        Self { ctx }
    }

    /// Batter-versus-bowler statistics.
    ///
    /// Both names must be known players. A matchup with no legal balls after
    /// filtering is reported as NotFound.
    pub async fn matchup(&self, query: MatchupQuery) -> Result<MatchupStats, ServiceError> {
        let batter = resolve_player(&self.ctx, &query.batter).await?;
        let bowler = resolve_player(&self.ctx, &query.bowler).await?;
        let query = MatchupQuery {
            batter,
            bowler,
            ..query
        };

        self.ctx
            .matchups()
            .matchup(&query)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                resource: "Matchup",
                identifier: format!("{} vs {}", query.batter, query.bowler),
                details: Some(json!({ "message": "Insufficient data for this matchup" })),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{seeded_store, DHONI, KOHLI, STEYN};

    fn query(batter: &str, bowler: &str) -> MatchupQuery {
        MatchupQuery {
            batter: batter.into(),
            bowler: bowler.into(),
            include_phases: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_matchup_echoes_stored_names() {
        let store = seeded_store().await;
        let service = MatchupService::new(store.ctx.clone());
        let stats = service.matchup(query("v kohli", "dw steyn")).await.unwrap();
        assert_eq!(stats.batter, KOHLI);
        assert_eq!(stats.bowler, STEYN);
        assert_eq!(stats.overall.runs, 22);
    }

    #[tokio::test]
    async fn test_unknown_player_and_empty_matchup() {
        let store = seeded_store().await;
        let service = MatchupService::new(store.ctx.clone());

        assert!(matches!(
            service.matchup(query(KOHLI, "Nobody")).await,
            Err(ServiceError::NotFound { resource: "Player", .. })
        ));

        match service.matchup(query(DHONI, STEYN)).await {
            Err(ServiceError::NotFound {
                resource,
                identifier,
                details,
            }) => {
                assert_eq!(resource, "Matchup");
                assert_eq!(identifier, "MS Dhoni vs DW Steyn");
                assert!(details.is_some());
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
