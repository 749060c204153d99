// storefront_app/src/web/handlers/chat_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront_core::NewChatMessage;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct SendMessagePayload {
  pub receiver_id: Uuid,
  pub message: String,
  #[serde(default)]
  pub product_id: Option<Uuid>,
  #[serde(default)]
  pub order_id: Option<Uuid>,
}

/// `?product_id=` selects a product thread; without it, the general thread.
#[derive(Deserialize, Debug)]
pub struct ThreadQuery {
  pub product_id: Option<Uuid>,
}

#[instrument(name = "handler::send_message", skip(app_state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn send_message_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<SendMessagePayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let message = app_state
    .shop
    .chat
    .send_message(NewChatMessage {
      sender_id: auth_user.user_id,
      receiver_id: payload.receiver_id,
      product_id: payload.product_id,
      order_id: payload.order_id,
      message: payload.message,
    })
    .await?;
  Ok(HttpResponse::Created().json(json!({ "message": message })))
}

#[instrument(name = "handler::fetch_thread", skip(app_state, auth_user, path, query), fields(other_id = %path.as_ref()))]
pub async fn fetch_thread_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  query: web::Query<ThreadQuery>,
) -> Result<HttpResponse, AppError> {
  let messages = app_state
    .shop
    .chat
    .fetch_thread(auth_user.user_id, path.into_inner(), query.product_id)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "messages": messages })))
}

#[instrument(name = "handler::mark_thread_read", skip(app_state, auth_user, path, query), fields(other_id = %path.as_ref()))]
pub async fn mark_thread_read_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  query: web::Query<ThreadQuery>,
) -> Result<HttpResponse, AppError> {
  let marked = app_state
    .shop
    .chat
    .mark_thread_read(auth_user.user_id, path.into_inner(), query.product_id)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "marked": marked })))
}

#[instrument(name = "handler::unread_messages", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn unread_count_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let unread = app_state.shop.chat.unread_count(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "unread": unread })))
}

#[instrument(name = "handler::conversations", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn conversations_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let conversations = app_state.shop.chat.conversations(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "conversations": conversations })))
}
