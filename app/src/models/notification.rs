// storefront_app/src/models/notification.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use storefront_core::Notification;
use uuid::Uuid;

pub const NOTIFICATION_COLUMNS: &str =
  "id, user_id, title, message, link, product_id, order_id, is_read, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
  pub id: Uuid,
  pub user_id: Uuid,
  pub title: String,
  pub message: String,
  pub link: Option<String>,
  pub product_id: Option<Uuid>,
  pub order_id: Option<Uuid>,
  pub is_read: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
  fn from(row: NotificationRow) -> Self {
    Notification {
      id: row.id,
      user_id: row.user_id,
      title: row.title,
      message: row.message,
      link: row.link,
      product_id: row.product_id,
      order_id: row.order_id,
      is_read: row.is_read,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}
