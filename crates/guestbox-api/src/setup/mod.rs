//! Application setup and initialization
//!
//! Everything `main` needs before the listener starts: configuration checks,
//! tracing, the storage and messaging backends, the ledger and staging area,
//! and the router.

pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use guestbox_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let storage = storage::setup_storage(&config).await?;

    let state = services::initialize_services(&config, storage).await?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
