use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub database: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Liveness plus a database ping
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: "OK",
        message: "Backend is running",
        database,
        timestamp: Utc::now(),
    })
}
