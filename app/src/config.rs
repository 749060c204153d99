// storefront_app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use storefront_core::ShopSettings;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
  Postgres,
  Memory,
}

impl FromStr for StorageBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
      "memory" => Ok(StorageBackend::Memory),
      other => Err(AppError::Config(format!(
        "Invalid STORAGE_BACKEND '{}': expected 'postgres' or 'memory'",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub storage_backend: StorageBackend,
  /// Required for the Postgres backend only.
  pub database_url: Option<String>,
  pub run_migrations: bool,
  pub admin_user_id: Uuid,
  pub realtime_capacity: usize,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let storage_backend = get_env("STORAGE_BACKEND")
      .unwrap_or_else(|_| "postgres".to_string())
      .parse::<StorageBackend>()?;
    let database_url = get_env("DATABASE_URL").ok();
    if storage_backend == StorageBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "DATABASE_URL is required when STORAGE_BACKEND=postgres".to_string(),
      ));
    }

    let run_migrations = get_env("RUN_MIGRATIONS")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;

    let admin_user_id = Uuid::parse_str(get_env("ADMIN_USER_ID")?.trim())
      .map_err(|e| AppError::Config(format!("Invalid ADMIN_USER_ID: {}", e)))?;

    let realtime_capacity = get_env("REALTIME_CAPACITY")
      .unwrap_or_else(|_| ShopSettings::DEFAULT_REALTIME_CAPACITY.to_string())
      .parse::<usize>()
      .map_err(|e| AppError::Config(format!("Invalid REALTIME_CAPACITY: {}", e)))?;
    if realtime_capacity == 0 {
      return Err(AppError::Config("REALTIME_CAPACITY must be at least 1".to_string()));
    }

    tracing::info!(
      storage = ?storage_backend,
      admin_user_id = %admin_user_id,
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      storage_backend,
      database_url,
      run_migrations,
      admin_user_id,
      realtime_capacity,
    })
  }

  pub fn shop_settings(&self) -> ShopSettings {
    ShopSettings {
      admin_user_id: self.admin_user_id,
      realtime_capacity: self.realtime_capacity,
    }
  }
}
