//! Health check handler and response type.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::state::AppState;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub ledger: String,
    pub storage_backend: String,
    pub messaging_backend: String,
}

/// `GET /health`: process is up and the ledger can be read.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ledger = state.ledger.clone();
    let ledger_status = run_check(
        TIMEOUT,
        async move { ledger.entries().await.map(drop) },
        "unhealthy",
    )
    .await;

    let healthy = ledger_status == "healthy";
    if !healthy {
        tracing::error!(ledger = %ledger_status, "Ledger health check failed");
    }

    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        ledger: ledger_status,
        storage_backend: state.config.storage_backend().to_string(),
        messaging_backend: state.config.messaging_backend().to_string(),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
