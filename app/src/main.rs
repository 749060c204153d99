// storefront_app/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use storefront_app::config::AppConfig;
use storefront_app::state::AppState;
use storefront_app::{build_shop, web};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  let shop = match build_shop(&app_config).await {
    Ok(shop) => shop,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialise the storage backend.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  let Some(dispatcher) = shop.dispatcher.clone().spawn() else {
    tracing::error!("Notification dispatcher could not claim its event feed.");
    return Err(std::io::Error::new(std::io::ErrorKind::Other, "dispatcher feed unavailable"));
  };
  let app_state = AppState::new(shop, app_config.clone());

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  let result = HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await;

  dispatcher.abort();
  tracing::info!("Storefront server stopped.");
  result
}
