// storefront_app/src/web/handlers/catalog_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state.shop.catalog.list_products().await?;
  info!("Successfully fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(json!({
      "message": "Products fetched successfully.",
      "products": products
  })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.shop.catalog.get_product(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Product fetched successfully.",
      "product": product
  })))
}

/// Active methods only; the admin catalog lives under `/admin`.
#[instrument(name = "handler::list_payment_methods", skip(app_state))]
pub async fn list_payment_methods_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let methods = app_state.shop.catalog.list_active_payment_methods().await?;
  Ok(HttpResponse::Ok().json(json!({ "payment_methods": methods })))
}
