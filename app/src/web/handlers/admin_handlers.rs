// storefront_app/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront_core::{OrderFilter, OrderStatus, PaymentMethodInput, PaymentStatus};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[derive(Deserialize, Debug)]
pub struct UpdateStatusPayload {
  pub order_status: OrderStatus,
  #[serde(default)]
  pub payment_status: Option<PaymentStatus>,
}

#[derive(Deserialize, Debug)]
pub struct SetActivePayload {
  pub is_active: bool,
}

#[instrument(name = "handler::admin_list_orders", skip(app_state, admin, filter))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  filter: web::Query<OrderFilter>,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.shop.orders.list_all_orders(&admin.0, &filter).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::admin_confirm_payment", skip(app_state, admin, path), fields(order_id = %path.as_ref()))]
pub async fn confirm_payment_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .shop
    .orders
    .confirm_payment_by_admin(&admin.0, path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Payment confirmed.", "order": order })))
}

#[instrument(
  name = "handler::admin_update_status",
  skip(app_state, admin, path, payload),
  fields(order_id = %path.as_ref(), order_status = %payload.order_status)
)]
pub async fn update_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .shop
    .orders
    .update_order_status(&admin.0, path.into_inner(), payload.order_status, payload.payment_status)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Order status updated.", "order": order })))
}

#[instrument(name = "handler::admin_delete_order", skip(app_state, admin, path), fields(order_id = %path.as_ref()))]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.shop.orders.delete_order(&admin.0, path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::admin_list_payment_methods", skip(app_state, admin))]
pub async fn list_payment_methods_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let methods = app_state.shop.catalog.list_all_payment_methods(&admin.0).await?;
  Ok(HttpResponse::Ok().json(json!({ "payment_methods": methods })))
}

#[instrument(name = "handler::admin_create_payment_method", skip(app_state, admin, payload))]
pub async fn create_payment_method_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  payload: web::Json<PaymentMethodInput>,
) -> Result<HttpResponse, AppError> {
  let method = app_state
    .shop
    .catalog
    .create_payment_method(&admin.0, payload.into_inner())
    .await?;
  info!("Payment method {} created via HTTP.", method.id);
  Ok(HttpResponse::Created().json(json!({ "payment_method": method })))
}

#[instrument(name = "handler::admin_update_payment_method", skip(app_state, admin, path, payload), fields(method_id = %path.as_ref()))]
pub async fn update_payment_method_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  payload: web::Json<PaymentMethodInput>,
) -> Result<HttpResponse, AppError> {
  let method = app_state
    .shop
    .catalog
    .update_payment_method(&admin.0, path.into_inner(), payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "payment_method": method })))
}

#[instrument(name = "handler::admin_set_payment_method_active", skip(app_state, admin, path), fields(method_id = %path.as_ref()))]
pub async fn set_payment_method_active_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  payload: web::Json<SetActivePayload>,
) -> Result<HttpResponse, AppError> {
  let method = app_state
    .shop
    .catalog
    .set_payment_method_active(&admin.0, path.into_inner(), payload.is_active)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "payment_method": method })))
}

#[instrument(name = "handler::admin_unified_chat", skip(app_state, admin, path), fields(buyer_id = %path.as_ref()))]
pub async fn unified_chat_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let entries = app_state
    .shop
    .chat
    .fetch_unified_thread(&admin.0, path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "entries": entries })))
}
