//! Batter profiles and recent form.

use tracing::debug;

use super::error::check_range;
use super::{resolve_player, ServiceError};
use crate::models::{CareerProfile, RecentForm, SeasonProfile};
use crate::repository::DbContext;

/// Largest recent-form window a caller may ask for.
pub const MAX_RECENT_MATCHES: i64 = 20;

#[derive(Clone)]
pub struct BatterService {
    ctx: DbContext,
}

impl BatterService {
    pub fn new(ctx: DbContext) -> Self {
        Self { ctx }
    }

    /// Career totals folded from every season the batter has faced a ball in.
    pub async fn career_profile(&self, name: &str) -> Result<CareerProfile, ServiceError> {
        let batter = match self.ctx.players().resolve(name).await? {
            Some(canonical) => canonical,
            None => return Err(ServiceError::not_found("Batter", name)),
        };
        let seasons = self.ctx.batters().season_profiles(&batter, None).await?;
        CareerProfile::from_seasons(batter, &seasons)
            .ok_or_else(|| ServiceError::not_found("Batter", name))
    }

    /// Per-season profiles, oldest first.
    ///
    /// Returns the canonical name with the seasons. With a season filter an
    /// empty list means "no data that season"; without one it is NotFound.
    pub async fn season_profiles(
        &self,
        name: &str,
        season: Option<&str>,
    ) -> Result<(String, Vec<SeasonProfile>), ServiceError> {
        let batter = resolve_player(&self.ctx, name).await?;
        let seasons = self.ctx.batters().season_profiles(&batter, season).await?;
        if seasons.is_empty() && season.is_none() {
            return Err(ServiceError::not_found("Batter", name));
        }
        Ok((batter, seasons))
    }

    /// The batter's last `matches` matches, most recent (highest id) first.
    pub async fn recent_form(
        &self,
        name: &str,
        matches: i64,
        season: Option<&str>,
    ) -> Result<RecentForm, ServiceError> {
        check_range("matches", matches, 1, MAX_RECENT_MATCHES)?;
        let batter = resolve_player(&self.ctx, name).await?;
        let form = self.ctx.batters().recent_form(&batter, matches, season).await?;
        debug!("Recent form for {}: {} matches", batter, form.matches.len());
        Ok(form)
    }
}
