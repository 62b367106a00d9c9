use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::state::AppState;

/// GET / - service info
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Flock API",
            "version": version,
            "description": "Church records backend: scoped hierarchy and bulletin access",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "scope": "/api/scope (protected)",
                "nodes": "/api/nodes, /api/nodes/tree (protected)",
                "bulletins": "/api/bulletins, /api/bulletins/active (protected)",
            }
        }
    }))
}

/// GET /health - database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "roles": state.registry.len(),
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                    }
                })),
            )
        }
    }
}
