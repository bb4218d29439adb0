use super::ServiceError;
use crate::models::MatchInfo;
use crate::repository::DbContext;

#[derive(Clone)]
pub struct MatchService {
    ctx: DbContext,
}

impl MatchService {
    pub fn new(ctx: DbContext) -> Self {
        Self { ctx }
    }

    pub async fn match_info(&self, match_id: i64) -> Result<MatchInfo, ServiceError> {
        self.ctx
            .matches()
            .get(match_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Match", match_id.to_string()))
    }

    /// Seasons with data, newest first.
    pub async fn seasons(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.ctx.matches().seasons().await?)
    }
}
