use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use crate::api::envelope;
use crate::database;
use crate::state::AppState;

/// GET / - service banner.
pub async fn root() -> impl IntoResponse {
    envelope::success(
        json!({
            "name": "Campus API",
            "version": env!("CARGO_PKG_VERSION"),
        }),
        "Campus API is running",
    )
}

/// GET /health - liveness plus a database ping.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match database::health_check(&state.pool).await {
        Ok(()) => envelope::success(
            json!({ "status": "ok", "database": "ok", "timestamp": Utc::now() }),
            "Healthy",
        )
        .into_response(),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "Database unavailable",
                    "errors": [],
                    "timestamp": Utc::now().to_rfc3339(),
                })),
            )
                .into_response()
        }
    }
}
