//! HTTP route handlers.
//!
//! - [`auth`] - Admin registration and login
//! - [`products`] - Catalog reads (public) and CRUD (admin)
//! - [`orders`] - Order placement (public) and management (admin)

pub mod auth;
pub mod orders;
pub mod products;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::AppState;

/// `GET /api/health`
///
/// Liveness probe that also reports database reachability.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database_ok = state.db.health_check().await;

    Json(serde_json::json!({
        "status": if database_ok { "ok" } else { "degraded" },
        "database": database_ok,
    }))
}

/// JSON 404 for unknown routes.
pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "NOT_FOUND",
            "message": "Route not found",
        })),
    )
}
