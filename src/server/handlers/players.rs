use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::super::error::{ApiError, ApiResult};
use super::super::responses::{PlayerListResponse, PlayerSearchResponse};
use super::super::AppState;
use super::helpers::non_blank;
use crate::services::MIN_SEARCH_CHARS;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<i64>,
}

pub async fn list_players(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<PlayerListResponse> {
    let Query(params) = params?;
    let limit = params.limit.unwrap_or(100);
    let offset = params.offset.unwrap_or(0);
    let search = non_blank(params.search);

    let page = state.players.list(search.as_deref(), limit, offset).await?;
    Ok(Json(PlayerListResponse::new(page, limit, offset)))
}

/// Autocomplete search. Queries shorter than two characters are rejected.
pub async fn search_players(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<PlayerSearchResponse> {
    let Query(params) = params?;
    if params.q.trim().chars().count() < MIN_SEARCH_CHARS {
        return Err(ApiError::bad_request(format!(
            "q must be at least {MIN_SEARCH_CHARS} characters"
        )));
    }
    let players = state
        .players
        .search(&params.q, params.limit.unwrap_or(10))
        .await?;
    Ok(Json(players.into()))
}
