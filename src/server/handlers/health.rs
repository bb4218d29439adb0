use axum::extract::{OriginalUri, State};
use axum::http::Method;
use axum::Json;

use super::super::error::ApiError;
use super::super::responses::{HealthResponse, RootResponse};
use super::super::AppState;

/// Service and store status. Always 200; a failed store probe reports `degraded`.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.ctx.test_connection().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!("Health check could not reach the database: {}", e);
            "error"
        }
    };

    Json(HealthResponse {
        status: if database == "connected" {
            "healthy"
        } else {
            "degraded"
        },
        database,
        version: state.api_version.clone(),
    })
}

pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        name: "IPL Analytics API",
        version: state.api_version.clone(),
        api_prefix: state.api_prefix.clone(),
    })
}

/// Fallback for unmatched routes, in the same error envelope as the API.
pub async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::not_found(format!("No route for {} {}", method, uri.path()))
}
