// storefront_app/src/lib.rs

//! HTTP server for the storefront: configuration, the PostgreSQL backend
//! and the actix-web surface over `storefront_core`.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod state;
pub mod web;

use std::sync::Arc;
use storefront_core::{Backends, MemoryBackend, Shop};
use tracing::{info, warn};

use crate::config::{AppConfig, StorageBackend};
use crate::db::PgBackend;
use crate::errors::{AppError, Result};

/// Connects the configured storage backend and wires every service to it.
pub async fn build_shop(config: &AppConfig) -> Result<Shop> {
  let backends = match config.storage_backend {
    StorageBackend::Postgres => {
      let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))?;
      let backend = PgBackend::connect(database_url).await?;
      if config.run_migrations {
        backend.run_migrations().await?;
      }
      Backends::from_shared(Arc::new(backend))
    }
    StorageBackend::Memory => {
      warn!("Using the in-memory backend; data is lost on restart.");
      Backends::from_shared(Arc::new(MemoryBackend::new()))
    }
  };
  info!("Storage backend ready: {:?}.", config.storage_backend);
  Ok(Shop::new(backends, config.shop_settings()))
}
