// storefront_app/src/db/notifications.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storefront_core::{Notification, NotificationBackend};
use uuid::Uuid;

use super::PgBackend;
use crate::models::notification::NOTIFICATION_COLUMNS;
use crate::models::NotificationRow;

#[async_trait]
impl NotificationBackend for PgBackend {
  async fn insert_notification(&self, notification: &Notification) -> Result<()> {
    sqlx::query(
      r#"
      INSERT INTO notifications (id, user_id, title, message, link, product_id, order_id, is_read, created_at, updated_at)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
      "#,
    )
    .bind(notification.id)
    .bind(notification.user_id)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.link)
    .bind(notification.product_id)
    .bind(notification.order_id)
    .bind(notification.is_read)
    .bind(notification.created_at)
    .bind(notification.updated_at)
    .execute(&self.pool)
    .await
    .with_context(|| format!("inserting notification for {}", notification.user_id))?;
    Ok(())
  }

  async fn list_notifications(&self, user_id: Uuid, limit: i64) -> Result<Vec<Notification>> {
    let rows: Vec<NotificationRow> = sqlx::query_as(&format!(
      "SELECT {} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id LIMIT $2",
      NOTIFICATION_COLUMNS
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(&self.pool)
    .await
    .context("listing notifications")?;
    Ok(rows.into_iter().map(Notification::from).collect())
  }

  async fn get_notification(&self, notification_id: Uuid) -> Result<Option<Notification>> {
    let row: Option<NotificationRow> =
      sqlx::query_as(&format!("SELECT {} FROM notifications WHERE id = $1", NOTIFICATION_COLUMNS))
        .bind(notification_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("fetching notification {}", notification_id))?;
    Ok(row.map(Notification::from))
  }

  async fn count_unread_notifications(&self, user_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read")
      .bind(user_id)
      .fetch_one(&self.pool)
      .await
      .context("counting unread notifications")?;
    Ok(count)
  }

  async fn mark_notification_read(&self, notification_id: Uuid, at: DateTime<Utc>) -> Result<bool> {
    let updated = sqlx::query("UPDATE notifications SET is_read = TRUE, updated_at = $2 WHERE id = $1")
      .bind(notification_id)
      .bind(at)
      .execute(&self.pool)
      .await
      .with_context(|| format!("marking notification {} read", notification_id))?
      .rows_affected();
    Ok(updated > 0)
  }

  async fn mark_all_notifications_read(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<u64> {
    let updated = sqlx::query("UPDATE notifications SET is_read = TRUE, updated_at = $2 WHERE user_id = $1 AND NOT is_read")
      .bind(user_id)
      .bind(at)
      .execute(&self.pool)
      .await
      .context("marking all notifications read")?
      .rows_affected();
    Ok(updated)
  }
}
