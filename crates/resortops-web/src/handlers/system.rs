//! Liveness and dependency health.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub drive_enabled: bool,
}

/// GET /health. Always 200; the body reports a database outage.
pub async fn health(State(state): State<SharedState>) -> Json<Health> {
    let database = match state.db.ping().await {
        Ok(()) => "up",
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            "down"
        }
    };
    Json(Health {
        status: if database == "up" { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        drive_enabled: state.drive.is_enabled(),
    })
}
