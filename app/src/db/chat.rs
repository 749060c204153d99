// storefront_app/src/db/chat.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storefront_core::{ChatBackend, ChatMessage, ThreadScope};
use uuid::Uuid;

use super::PgBackend;
use crate::models::chat_message::CHAT_MESSAGE_COLUMNS;
use crate::models::ChatMessageRow;

/// Extra predicate on `product_id` for a scope, with the placeholder it binds.
fn scope_clause(scope: ThreadScope, placeholder: usize) -> (String, Option<Uuid>) {
  match scope {
    ThreadScope::General => ("AND product_id IS NULL".to_string(), None),
    ThreadScope::Product(id) => (format!("AND product_id = ${}", placeholder), Some(id)),
    ThreadScope::All => (String::new(), None),
  }
}

#[async_trait]
impl ChatBackend for PgBackend {
  async fn insert_message(&self, message: &ChatMessage) -> Result<()> {
    sqlx::query(
      r#"
      INSERT INTO chat_messages (id, sender_id, receiver_id, product_id, order_id, message, is_read, created_at, updated_at)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
      "#,
    )
    .bind(message.id)
    .bind(message.sender_id)
    .bind(message.receiver_id)
    .bind(message.product_id)
    .bind(message.order_id)
    .bind(&message.message)
    .bind(message.is_read)
    .bind(message.created_at)
    .bind(message.updated_at)
    .execute(&self.pool)
    .await
    .context("inserting chat message")?;
    Ok(())
  }

  async fn list_thread(&self, user_a: Uuid, user_b: Uuid, scope: ThreadScope) -> Result<Vec<ChatMessage>> {
    let (clause, product_id) = scope_clause(scope, 3);
    let sql = format!(
      r#"
      SELECT {} FROM chat_messages
      WHERE ((sender_id = $1 AND receiver_id = $2) OR (sender_id = $2 AND receiver_id = $1)) {}
      ORDER BY created_at ASC, id ASC
      "#,
      CHAT_MESSAGE_COLUMNS, clause
    );
    let mut query = sqlx::query_as::<_, ChatMessageRow>(&sql).bind(user_a).bind(user_b);
    if let Some(id) = product_id {
      query = query.bind(id);
    }
    let rows = query.fetch_all(&self.pool).await.context("listing chat thread")?;
    Ok(rows.into_iter().map(ChatMessage::from).collect())
  }

  async fn list_messages_for(&self, user_id: Uuid) -> Result<Vec<ChatMessage>> {
    let rows: Vec<ChatMessageRow> = sqlx::query_as(&format!(
      "SELECT {} FROM chat_messages WHERE sender_id = $1 OR receiver_id = $1 ORDER BY created_at ASC, id ASC",
      CHAT_MESSAGE_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await
    .context("listing chat messages")?;
    Ok(rows.into_iter().map(ChatMessage::from).collect())
  }

  async fn mark_thread_read(&self, reader_id: Uuid, sender_id: Uuid, scope: ThreadScope, at: DateTime<Utc>) -> Result<u64> {
    let (clause, product_id) = scope_clause(scope, 4);
    let sql = format!(
      "UPDATE chat_messages SET is_read = TRUE, updated_at = $3 \
       WHERE receiver_id = $1 AND sender_id = $2 AND NOT is_read {}",
      clause
    );
    let mut query = sqlx::query(&sql).bind(reader_id).bind(sender_id).bind(at);
    if let Some(id) = product_id {
      query = query.bind(id);
    }
    let updated = query
      .execute(&self.pool)
      .await
      .context("marking chat thread read")?
      .rows_affected();
    Ok(updated)
  }

  async fn count_unread_messages(&self, user_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_messages WHERE receiver_id = $1 AND NOT is_read")
      .bind(user_id)
      .fetch_one(&self.pool)
      .await
      .context("counting unread chat messages")?;
    Ok(count)
  }
}
