// storefront_core/src/services/inbox.rs

use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::degrade_read;
use crate::backend::NotificationBackend;
use crate::error::{ShopError, ShopResult};
use crate::notification::Notification;

/// The recipient-facing side of notifications.
#[derive(Clone)]
pub struct NotificationInbox {
    notifications: Arc<dyn NotificationBackend>,
}

impl fmt::Debug for NotificationInbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationInbox").finish_non_exhaustive()
    }
}

impl NotificationInbox {
    pub const DEFAULT_LIMIT: i64 = 50;

    pub fn new(notifications: Arc<dyn NotificationBackend>) -> Self {
        Self { notifications }
    }

    #[instrument(name = "inbox::list", skip(self), fields(user_id = %user_id))]
    pub async fn list(&self, user_id: Uuid, limit: Option<i64>) -> ShopResult<Vec<Notification>> {
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, 200);
        let result = self
            .notifications
            .list_notifications(user_id, limit)
            .await
            .map_err(ShopError::from);
        degrade_read(result, "notifications")
    }

    #[instrument(name = "inbox::unread_count", skip(self), fields(user_id = %user_id))]
    pub async fn unread_count(&self, user_id: Uuid) -> ShopResult<i64> {
        let result = self
            .notifications
            .count_unread_notifications(user_id)
            .await
            .map_err(ShopError::from);
        degrade_read(result, "unread notification count")
    }

    #[instrument(
        name = "inbox::mark_read",
        skip(self),
        fields(user_id = %user_id, notification_id = %notification_id),
        err(Display)
    )]
    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> ShopResult<()> {
        let notification = self
            .notifications
            .get_notification(notification_id)
            .await?
            .ok_or_else(|| ShopError::not_found("notification", notification_id))?;
        if notification.user_id != user_id {
            return Err(ShopError::Unauthorized(format!(
                "Notification {} belongs to another user",
                notification_id
            )));
        }
        if notification.is_read {
            return Ok(());
        }
        if !self.notifications.mark_notification_read(notification_id, Utc::now()).await? {
            return Err(ShopError::not_found("notification", notification_id));
        }
        Ok(())
    }

    #[instrument(name = "inbox::mark_all_read", skip(self), fields(user_id = %user_id), err(Display))]
    pub async fn mark_all_read(&self, user_id: Uuid) -> ShopResult<u64> {
        let marked = self.notifications.mark_all_notifications_read(user_id, Utc::now()).await?;
        debug!("Marked {} notifications read for {}.", marked, user_id);
        Ok(marked)
    }
}
