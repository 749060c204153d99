// storefront_core/src/services/dispatcher.rs

//! Notification Dispatcher: turns order events and chat messages into
//! persisted notifications plus live toasts.
//!
//! Persisting and pushing are independent. A failed insert still pushes a
//! toast to a connected recipient, and a recipient without a connection
//! still gets the row. Failures are logged and never reach the operation
//! that produced the event.

use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::backend::NotificationBackend;
use crate::chat::ChatMessage;
use crate::notification::{chat_message_notification, order_event_notifications, NewNotification};
use crate::order::OrderEvent;
use crate::realtime::{DispatchEvent, Realtime};

/// What happened to one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delivery {
    pub persisted: bool,
    pub pushed: bool,
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    notifications: Arc<dyn NotificationBackend>,
    realtime: Realtime,
    admin_user_id: Uuid,
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("admin_user_id", &self.admin_user_id)
            .finish_non_exhaustive()
    }
}

impl NotificationDispatcher {
    pub fn new(notifications: Arc<dyn NotificationBackend>, realtime: Realtime, admin_user_id: Uuid) -> Self {
        Self {
            notifications,
            realtime,
            admin_user_id,
        }
    }

    /// Claims the dispatch feed and drains it on a background task. Events
    /// queued before the call are handled too. Returns `None` when another
    /// dispatcher already owns the feed.
    pub fn spawn(self) -> Option<JoinHandle<()>> {
        let Some(feed) = self.realtime.dispatch.claim() else {
            warn!("Dispatch feed already claimed; not starting a second dispatcher.");
            return None;
        };
        Some(tokio::spawn(async move { self.run(feed).await }))
    }

    pub async fn run(self, mut feed: UnboundedReceiver<DispatchEvent>) {
        info!("Notification dispatcher started.");
        while let Some(event) = feed.recv().await {
            match event {
                DispatchEvent::Order(event) => {
                    self.handle_order_event(&event).await;
                }
                DispatchEvent::Chat(message) => {
                    self.handle_chat_message(&message).await;
                }
            }
        }
        info!("Notification dispatcher stopped: the dispatch feed closed.");
    }

    #[instrument(
        name = "dispatcher::handle_order_event",
        skip(self, event),
        fields(order_id = %event.order_id, kind = ?event.kind)
    )]
    pub async fn handle_order_event(&self, event: &OrderEvent) -> Vec<Delivery> {
        let pending = order_event_notifications(event, self.admin_user_id);
        if pending.is_empty() {
            debug!("No notification for this order event.");
        }
        let mut deliveries = Vec::with_capacity(pending.len());
        for notification in pending {
            deliveries.push(self.deliver(notification).await);
        }
        deliveries
    }

    #[instrument(name = "dispatcher::handle_chat_message", skip(self, message), fields(message_id = %message.id))]
    pub async fn handle_chat_message(&self, message: &ChatMessage) -> Delivery {
        let notification = chat_message_notification(message, self.admin_user_id);
        self.deliver(notification).await
    }

    async fn deliver(&self, notification: NewNotification) -> Delivery {
        let id = Uuid::new_v4();
        let row = notification.clone().into_notification(id, Utc::now());
        let persisted = match self.notifications.insert_notification(&row).await {
            Ok(()) => true,
            Err(e) => {
                error!(user_id = %row.user_id, error = %e, "Failed to persist notification '{}'.", row.title);
                false
            }
        };

        let toast = notification.toast(persisted.then_some(id));
        let pushed = self.realtime.toasts.push(toast);
        if !persisted && !pushed {
            warn!(user_id = %row.user_id, "Notification '{}' was neither stored nor pushed.", row.title);
        }
        Delivery { persisted, pushed }
    }
}
