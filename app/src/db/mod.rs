// storefront_app/src/db/mod.rs

//! PostgreSQL implementation of the storefront backend traits.

mod catalog;
mod chat;
mod notifications;
mod orders;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct PgBackend {
  pool: PgPool,
}

impl PgBackend {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  #[instrument(name = "db::connect", skip(database_url), err(Display))]
  pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(10)
      .connect(database_url)
      .await
      .context("connecting to PostgreSQL")?;
    info!("Successfully connected to the database.");
    Ok(Self::new(pool))
  }

  #[instrument(name = "db::run_migrations", skip(self), err(Display))]
  pub async fn run_migrations(&self) -> anyhow::Result<()> {
    info!("Running database migrations.");
    sqlx::migrate!("./migrations")
      .run(&self.pool)
      .await
      .context("running migrations")?;
    info!("Database migrations completed.");
    Ok(())
  }
}
