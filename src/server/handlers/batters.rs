use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::super::error::ApiResult;
use super::super::responses::{
    BatterProfileResponse, BatterRecentFormResponse, BatterSeasonProfileResponse,
};
use super::super::AppState;
use super::helpers::non_blank;

#[derive(Debug, Deserialize)]
pub struct RecentFormParams {
    pub matches: Option<i64>,
    pub season: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonParams {
    pub season: Option<String>,
}

pub async fn batter_profile(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
) -> ApiResult<BatterProfileResponse> {
    let Path(name) = name?;
    let profile = state.batters.career_profile(&name).await?;
    Ok(Json(profile.into()))
}

pub async fn batter_recent_form(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
    params: Result<Query<RecentFormParams>, QueryRejection>,
) -> ApiResult<BatterRecentFormResponse> {
    let Path(name) = name?;
    let Query(params) = params?;
    let season = non_blank(params.season);

    let form = state
        .batters
        .recent_form(&name, params.matches.unwrap_or(5), season.as_deref())
        .await?;
    Ok(Json(form.into()))
}

pub async fn batter_season_profile(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
    params: Result<Query<SeasonParams>, QueryRejection>,
) -> ApiResult<BatterSeasonProfileResponse> {
    let Path(name) = name?;
    let Query(params) = params?;
    let season = non_blank(params.season);

    let (batter, seasons) = state
        .batters
        .season_profiles(&name, season.as_deref())
        .await?;
    Ok(Json(BatterSeasonProfileResponse::new(batter, seasons)))
}
