use super::error::check_range;
use super::ServiceError;
use crate::models::PlayerMatches;
use crate::repository::{DbContext, PlayerPage};

pub const MAX_LIST_LIMIT: i64 = 1000;
pub const MAX_SEARCH_LIMIT: i64 = 50;
/// Shorter search queries return nothing.
pub const MIN_SEARCH_CHARS: usize = 2;

#[derive(Clone)]
pub struct PlayerService {
    ctx: DbContext,
}

impl PlayerService {
    pub fn new(ctx: DbContext) -> Self {
        Self { ctx }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<PlayerPage, ServiceError> {
        check_range("limit", limit, 1, MAX_LIST_LIMIT)?;
        if offset < 0 {
            return Err(ServiceError::bad_request(format!(
                "offset must not be negative, got {offset}"
            )));
        }
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.ctx.players().list(search, limit, offset).await?)
    }

    /// Players whose name contains `query`, most matches batted first.
    ///
    /// Queries under two characters return an empty list without touching
    /// the store.
    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<PlayerMatches>, ServiceError> {
        check_range("limit", limit, 1, MAX_SEARCH_LIMIT)?;
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Ok(Vec::new());
        }
        Ok(self.ctx.players().search(query, limit).await?)
    }

    pub async fn exists(&self, name: &str) -> Result<bool, ServiceError> {
        Ok(self.ctx.players().exists(name).await?)
    }
}
