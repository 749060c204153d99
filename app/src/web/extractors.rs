// storefront_app/src/web/extractors.rs

//! Caller identity. The user id travels in the `X-User-ID` header; whether
//! the caller is the admin is decided by the configured admin id.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use storefront_core::Actor;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "X-User-ID";

#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
  pub actor: Actor,
}

/// An authenticated caller that is also the configured admin.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub Actor);

fn user_id_from_header(req: &HttpRequest) -> Result<Uuid, AppError> {
  req
    .headers()
    .get(USER_ID_HEADER)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| Uuid::parse_str(value.trim()).ok())
    .ok_or_else(|| {
      warn!("Missing or invalid {} header.", USER_ID_HEADER);
      AppError::Auth(format!("User authentication required. Missing or invalid {} header.", USER_ID_HEADER))
    })
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let user_id = user_id_from_header(req)?;
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))?;
  Ok(AuthenticatedUser {
    user_id,
    actor: state.actor_for(user_id),
  })
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(authenticate(req))
  }
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let result = authenticate(req).and_then(|user| {
      if user.actor.is_admin() {
        Ok(AdminUser(user.actor))
      } else {
        warn!(user_id = %user.user_id, "Non-admin caller on an admin route.");
        Err(AppError::Forbidden("Admin access required.".to_string()))
      }
    });
    ready(result)
  }
}
