//! HTTP API for the analytics store.
//!
//! Every route is read-only. Handlers call the service layer and map its
//! errors into the JSON error envelope.

mod error;
mod handlers;
mod responses;
mod routes;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;

use std::net::SocketAddr;

use crate::config::Settings;
use crate::repository::DbContext;
use crate::services::{BatterService, MatchService, MatchupService, PlayerService};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub ctx: DbContext,
    pub batters: BatterService,
    pub matchups: MatchupService,
    pub players: PlayerService,
    pub matches: MatchService,
    pub api_version: String,
    pub api_prefix: String,
}

impl AppState {
    pub fn new(ctx: DbContext, settings: &Settings) -> Self {
        Self {
            batters: BatterService::new(ctx.clone()),
            matchups: MatchupService::new(ctx.clone()),
            players: PlayerService::new(ctx.clone()),
            matches: MatchService::new(ctx.clone()),
            ctx,
            api_version: settings.api_version.clone(),
            api_prefix: settings.api_prefix.clone(),
        }
    }
}

/// Start the web server and run until Ctrl-C.
///
/// The pool is closed once the server has drained.
pub async fn serve(ctx: DbContext, settings: &Settings, addr: SocketAddr) -> anyhow::Result<()> {
    ctx.pool().warm_up(settings.pool_min).await?;

    let state = AppState::new(ctx.clone(), settings);
    let app = create_router(state);

    tracing::info!(
        "Starting server at http://{}{}",
        addr,
        settings.api_prefix
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped; closing database pool");
    ctx.close();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::repository::testing::{seeded_store, TestStore};

    async fn setup_test_app() -> (axum::Router, TestStore) {
        let store = seeded_store().await;
        let state = AppState::new(store.ctx.clone(), &Settings::default());
        (create_router(state), store)
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _store) = setup_test_app().await;
        let (status, json) = get_json(app, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["database"], "connected");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_health_degraded_when_store_closed() {
        let (app, store) = setup_test_app().await;
        store.ctx.close();
        let (status, json) = get_json(app, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["database"], "error");
    }

    #[tokio::test]
    async fn test_root() {
        let (app, _store) = setup_test_app().await;
        let (status, json) = get_json(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["api_prefix"], "/api/v1");
    }

    #[tokio::test]
    async fn test_unknown_route_uses_error_envelope() {
        let (app, _store) = setup_test_app().await;
        let (status, json) = get_json(app.clone(), "/api/v1/bowlers/DW%20Steyn").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["details"], serde_json::json!({}));

        let (status, json) = get_json(app, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "No route for GET /nope");
    }

    #[tokio::test]
    async fn test_batter_profile() {
        let (app, _store) = setup_test_app().await;
        let (status, json) = get_json(app, "/api/v1/batters/v%20kohli/profile").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["batter"], "V Kohli");
        assert_eq!(json["career"]["runs"], 27);
        assert_eq!(json["career"]["highest_score"], 12);
        assert_eq!(json["career"]["average"], 13.5);
        assert_eq!(json["dismissals"]["caught"], 1);
        assert_eq!(json["dismissals"]["lbw"], 0);
        assert_eq!(json["phase_performance"]["death"]["runs"], 12);
    }

    #[tokio::test]
    async fn test_unknown_batter_is_not_found_envelope() {
        let (app, _store) = setup_test_app().await;
        let (status, json) = get_json(app, "/api/v1/batters/Nobody/profile").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "Batter 'Nobody' not found");
    }

    #[tokio::test]
    async fn test_recent_form() {
        let (app, _store) = setup_test_app().await;
        let (status, json) =
            get_json(app.clone(), "/api/v1/batters/V%20Kohli/recent-form?matches=2").await;
        assert_eq!(status, StatusCode::OK);
        let matches = json["recent_matches"].as_array().unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0]["match_id"], 300);
        assert_eq!(json["summary"]["runs"], 16);
        assert_eq!(json["summary"]["matches"], 2);

        let (status, json) =
            get_json(app.clone(), "/api/v1/batters/V%20Kohli/recent-form?matches=21").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let (status, json) =
            get_json(app, "/api/v1/batters/V%20Kohli/recent-form?matches=lots").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_season_profile() {
        let (app, _store) = setup_test_app().await;
        let (status, json) =
            get_json(app.clone(), "/api/v1/batters/V%20Kohli/profile/seasons").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_seasons"], 2);
        assert_eq!(json["seasons"][0]["season"], "2008");

        let (status, json) =
            get_json(app, "/api/v1/batters/V%20Kohli/profile/seasons?season=2015").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_seasons"], 0);
    }

    #[tokio::test]
    async fn test_matchup() {
        let (app, _store) = setup_test_app().await;
        let (status, json) = get_json(
            app.clone(),
            "/api/v1/matchups/batter/V%20Kohli/bowler/DW%20Steyn",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["overall"]["balls"], 7);
        assert_eq!(json["overall"]["confidence_score"], 14);
        assert_eq!(json["phase_breakdown"], Value::Null);
        assert_eq!(json["recent_encounters"].as_array().unwrap().len(), 2);

        let (status, json) = get_json(
            app,
            "/api/v1/matchups/batter/MS%20Dhoni/bowler/DW%20Steyn?include_phases=false",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            json["error"]["details"]["message"],
            "Insufficient data for this matchup"
        );
    }

    #[tokio::test]
    async fn test_players() {
        let (app, _store) = setup_test_app().await;
        let (status, json) = get_json(app.clone(), "/api/v1/players?limit=2&offset=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 5);
        assert_eq!(json["limit"], 2);
        assert_eq!(json["offset"], 1);
        assert_eq!(json["players"].as_array().unwrap().len(), 2);

        let (status, _) = get_json(app.clone(), "/api/v1/players?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = get_json(app.clone(), "/api/v1/players/search?q=ko").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["players"][0]["name"], "V Kohli");
        assert_eq!(json["players"][0]["matches"], 3);

        let (status, json) = get_json(app.clone(), "/api/v1/players/search?q=k").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let (status, _) = get_json(app, "/api/v1/players/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_matches_and_seasons() {
        let (app, _store) = setup_test_app().await;
        let (status, json) = get_json(app.clone(), "/api/v1/matches/200").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["venue"], "Wankhede Stadium");
        assert_eq!(json["teams"], Value::Null);

        let (status, _) = get_json(app.clone(), "/api/v1/matches/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, json) = get_json(app.clone(), "/api/v1/matches/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let (status, json) = get_json(app, "/api/v1/seasons").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["seasons"], serde_json::json!(["2009", "2008"]));
    }
}
