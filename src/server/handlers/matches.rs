use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;

use super::super::error::ApiResult;
use super::super::responses::{MatchInfoResponse, SeasonsResponse};
use super::super::AppState;

pub async fn match_info(
    State(state): State<AppState>,
    match_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<MatchInfoResponse> {
    let Path(match_id) = match_id?;
    let info = state.matches.match_info(match_id).await?;
    Ok(Json(info.into()))
}

/// Seasons with data, newest first.
pub async fn list_seasons(State(state): State<AppState>) -> ApiResult<SeasonsResponse> {
    let seasons = state.matches.seasons().await?;
    Ok(Json(SeasonsResponse { seasons }))
}
