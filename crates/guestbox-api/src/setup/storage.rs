//! Container storage setup

use anyhow::{Context, Result};
use guestbox_core::Config;
use guestbox_storage::ContainerStorage;
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn ContainerStorage>> {
    let storage = guestbox_storage::create_storage(config)
        .await
        .context("Failed to initialize container storage")?;

    tracing::info!(
        backend = %storage.backend_type(),
        "Container storage initialized"
    );

    Ok(storage)
}
