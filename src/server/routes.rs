//! Router configuration for the API server.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
///
/// API routes are nested under `state.api_prefix`; `/` stays at the root.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        // Players
        .route("/players", get(handlers::list_players))
        .route("/players/search", get(handlers::search_players))
        // Batters
        .route("/batters/:name/profile", get(handlers::batter_profile))
        .route(
            "/batters/:name/profile/seasons",
            get(handlers::batter_season_profile),
        )
        .route(
            "/batters/:name/recent-form",
            get(handlers::batter_recent_form),
        )
        // Matchups
        .route(
            "/matchups/batter/:batter/bowler/:bowler",
            get(handlers::batter_bowler_matchup),
        )
        // Matches and seasons
        .route("/matches/:match_id", get(handlers::match_info))
        .route("/seasons", get(handlers::list_seasons));

    let router = if state.api_prefix.is_empty() {
        api
    } else {
        Router::new().nest(&state.api_prefix, api)
    };

    router
        .route("/", get(handlers::root))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
