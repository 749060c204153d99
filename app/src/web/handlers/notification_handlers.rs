// storefront_app/src/web/handlers/notification_handlers.rs

use actix_web::{web, HttpResponse};
use futures_util::stream;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::handlers::{sse_frame, sse_response};
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct ListNotificationsQuery {
  pub limit: Option<i64>,
}

#[instrument(name = "handler::list_notifications", skip(app_state, auth_user, query), fields(user_id = %auth_user.user_id))]
pub async fn list_notifications_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  query: web::Query<ListNotificationsQuery>,
) -> Result<HttpResponse, AppError> {
  let notifications = app_state.shop.inbox.list(auth_user.user_id, query.limit).await?;
  Ok(HttpResponse::Ok().json(json!({ "notifications": notifications })))
}

#[instrument(name = "handler::unread_notifications", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn unread_count_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let unread = app_state.shop.inbox.unread_count(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "unread": unread })))
}

#[instrument(
  name = "handler::mark_notification_read",
  skip(app_state, auth_user, path),
  fields(notification_id = %path.as_ref())
)]
pub async fn mark_read_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.shop.inbox.mark_read(auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::mark_all_notifications_read", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn mark_all_read_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let marked = app_state.shop.inbox.mark_all_read(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "marked": marked })))
}

/// Server-sent events carrying live toasts. The caller counts as connected
/// for as long as the response body is being streamed.
#[instrument(name = "handler::toast_stream", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn toast_stream_handler(app_state: web::Data<AppState>, auth_user: AuthenticatedUser) -> HttpResponse {
  let connection = app_state.shop.realtime.toasts.connect(auth_user.user_id);
  info!("Live toast stream opened.");

  let toasts = stream::unfold(connection, |mut connection| async move {
    let toast = connection.recv().await?;
    Some((sse_frame("toast", &toast), connection))
  });
  sse_response(toasts)
}
