// storefront_app/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use futures_util::stream;
use serde::Deserialize;
use serde_json::json;
use storefront_core::{CartLine, ShippingInfo};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::handlers::{sse_frame, sse_response};
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct CreateOrderPayload {
  pub items: Vec<CartLine>,
  pub shipping: ShippingInfo,
}

#[derive(Deserialize, Debug)]
pub struct SelectPaymentMethodPayload {
  pub payment_method_id: Uuid,
}

#[instrument(name = "handler::create_order", skip(app_state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<CreateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let created = app_state
    .shop
    .orders
    .create_order(auth_user.user_id, &payload.items, payload.shipping)
    .await?;
  info!("Order {} placed via HTTP.", created.order.id);

  Ok(HttpResponse::Created().json(json!({
      "message": "Order created successfully.",
      "order": created.order,
      "items": created.items,
      "payable_amount": created.order.payable_amount(),
  })))
}

#[instrument(name = "handler::list_my_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_my_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.shop.orders.list_orders_for_user(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::get_order", skip(app_state, auth_user, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.shop.orders.get_order(&auth_user.actor, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

#[instrument(
  name = "handler::select_payment_method",
  skip(app_state, auth_user, path, payload),
  fields(order_id = %path.as_ref())
)]
pub async fn select_payment_method_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<SelectPaymentMethodPayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .shop
    .orders
    .select_payment_method(path.into_inner(), auth_user.user_id, payload.payment_method_id)
    .await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Payment method selected. Waiting for payment confirmation.",
      "order": order,
  })))
}

#[instrument(name = "handler::confirm_payment_by_buyer", skip(app_state, auth_user, path), fields(order_id = %path.as_ref()))]
pub async fn confirm_payment_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .shop
    .orders
    .confirm_payment_by_buyer(path.into_inner(), auth_user.user_id)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Payment confirmed.", "order": order })))
}

#[instrument(name = "handler::cancel_order", skip(app_state, auth_user, path), fields(order_id = %path.as_ref()))]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .shop
    .orders
    .cancel_order_by_buyer(path.into_inner(), auth_user.user_id)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Order cancelled.", "order": order })))
}

/// Server-sent order events. Buyers only see events for their own orders;
/// the admin sees every order.
#[instrument(name = "handler::order_event_stream", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn order_event_stream_handler(app_state: web::Data<AppState>, auth_user: AuthenticatedUser) -> HttpResponse {
  let subscription = app_state.shop.realtime.subscribe_orders(auth_user.actor);
  info!("Order event stream opened.");

  let events = stream::unfold(subscription, |mut subscription| async move {
    let event = subscription.recv().await?;
    Some((sse_frame("order", &event), subscription))
  });
  sse_response(events)
}
