use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::super::error::ApiResult;
use super::super::responses::MatchupResponse;
use super::super::AppState;
use super::helpers::non_blank;
use crate::repository::MatchupQuery;

#[derive(Debug, Deserialize)]
pub struct MatchupParams {
    pub season: Option<String>,
    pub venue: Option<String>,
    pub include_phases: Option<bool>,
}

pub async fn batter_bowler_matchup(
    State(state): State<AppState>,
    names: Result<Path<(String, String)>, PathRejection>,
    params: Result<Query<MatchupParams>, QueryRejection>,
) -> ApiResult<MatchupResponse> {
    let Path((batter, bowler)) = names?;
    let Query(params) = params?;

    let stats = state
        .matchups
        .matchup(MatchupQuery {
            batter,
            bowler,
            season: non_blank(params.season),
            venue: non_blank(params.venue),
            include_phases: params.include_phases.unwrap_or(true),
        })
        .await?;
    Ok(Json(stats.into()))
}
