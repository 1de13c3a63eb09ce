use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::state::AppState;
use crate::utils::response::success;

pub mod boletos;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
    database: &'static str,
    keycloak: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> Response {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };
    let keycloak = if state.identity.probe().await {
        "connected"
    } else {
        "disconnected"
    };

    let status = if database == "connected" {
        "healthy"
    } else {
        "unhealthy"
    };

    let payload = HealthPayload {
        status,
        service: "conciertop-api",
        database,
        keycloak,
    };

    success(payload, "Health check successful").into_response()
}
