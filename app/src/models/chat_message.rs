// storefront_app/src/models/chat_message.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use storefront_core::ChatMessage;
use uuid::Uuid;

pub const CHAT_MESSAGE_COLUMNS: &str =
  "id, sender_id, receiver_id, product_id, order_id, message, is_read, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct ChatMessageRow {
  pub id: Uuid,
  pub sender_id: Uuid,
  pub receiver_id: Uuid,
  pub product_id: Option<Uuid>,
  pub order_id: Option<Uuid>,
  pub message: String,
  pub is_read: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<ChatMessageRow> for ChatMessage {
  fn from(row: ChatMessageRow) -> Self {
    ChatMessage {
      id: row.id,
      sender_id: row.sender_id,
      receiver_id: row.receiver_id,
      product_id: row.product_id,
      order_id: row.order_id,
      message: row.message,
      is_read: row.is_read,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}
