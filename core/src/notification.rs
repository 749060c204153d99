// storefront_core/src/notification.rs

//! Notification rows and the rules that derive them from order events and
//! chat messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::ChatMessage;
use crate::order::{OrderEvent, OrderEventKind, OrderStatus, PaymentStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
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

/// Toast severity. Not persisted; it only styles the live push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub product_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub level: NotificationLevel,
}

impl NewNotification {
    pub fn into_notification(self, id: Uuid, now: DateTime<Utc>) -> Notification {
        Notification {
            id,
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            link: self.link,
            product_id: self.product_id,
            order_id: self.order_id,
            is_read: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn toast(&self, notification_id: Option<Uuid>) -> LiveToast {
        LiveToast {
            notification_id,
            user_id: self.user_id,
            title: self.title.clone(),
            message: self.message.clone(),
            link: self.link.clone(),
            level: self.level,
        }
    }
}

/// A notification pushed to a connected client. `notification_id` is missing
/// when persisting the row failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveToast {
    pub notification_id: Option<Uuid>,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub level: NotificationLevel,
}

/// Client routes that notifications deep-link into.
pub mod routes {
    use uuid::Uuid;

    pub fn order_detail(order_id: Uuid) -> String {
        format!("/orders/{}", order_id)
    }

    pub fn admin_order_detail(order_id: Uuid) -> String {
        format!("/admin/orders/{}", order_id)
    }

    pub fn product_detail(product_id: Uuid) -> String {
        format!("/products/{}", product_id)
    }

    pub fn chat() -> String {
        "/chat".to_string()
    }

    pub fn admin_chat(buyer_id: Uuid) -> String {
        format!("/admin/chat/{}", buyer_id)
    }
}

/// Formats an amount in the smallest currency unit with `.` grouping.
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_uppercase()
}

fn buyer_order_notification(event: &OrderEvent, title: &str, message: String, level: NotificationLevel) -> NewNotification {
    NewNotification {
        user_id: event.buyer_id,
        title: title.to_string(),
        message,
        link: Some(routes::order_detail(event.order_id)),
        product_id: None,
        order_id: Some(event.order_id),
        level,
    }
}

fn admin_order_notification(admin_id: Uuid, event: &OrderEvent, title: &str, message: String) -> NewNotification {
    NewNotification {
        user_id: admin_id,
        title: title.to_string(),
        message,
        link: Some(routes::admin_order_detail(event.order_id)),
        product_id: None,
        order_id: Some(event.order_id),
        level: NotificationLevel::Info,
    }
}

fn status_phrase(status: OrderStatus, order_ref: &str) -> (&'static str, String, NotificationLevel) {
    match status {
        OrderStatus::Pending => (
            "Order pending",
            format!("Order #{} is waiting for payment.", order_ref),
            NotificationLevel::Info,
        ),
        OrderStatus::Processing => (
            "Order is being processed",
            format!("Order #{} is being prepared.", order_ref),
            NotificationLevel::Info,
        ),
        OrderStatus::Completed => (
            "Order completed",
            format!("Order #{} has been completed. Thank you for shopping!", order_ref),
            NotificationLevel::Success,
        ),
        OrderStatus::Cancelled => (
            "Order cancelled",
            format!("Order #{} has been cancelled and marked for refund.", order_ref),
            NotificationLevel::Error,
        ),
    }
}

/// Notifications for one order event: at most one for the buyer and at most
/// one for the admin.
pub fn order_event_notifications(event: &OrderEvent, admin_id: Uuid) -> Vec<NewNotification> {
    let order_ref = short_id(event.order_id);
    let mut out = Vec::new();

    match event.kind {
        OrderEventKind::Created => {
            out.push(buyer_order_notification(
                event,
                "Order created",
                format!(
                    "Order #{} has been placed. Please pay {} (including unique code {}).",
                    order_ref,
                    format_amount(event.total_amount + i64::from(event.payment_unique_code)),
                    event.payment_unique_code
                ),
                NotificationLevel::Success,
            ));
            if admin_id != event.buyer_id {
                out.push(admin_order_notification(
                    admin_id,
                    event,
                    "New order",
                    format!("New order #{} worth {}.", order_ref, format_amount(event.total_amount)),
                ));
            }
        }
        OrderEventKind::StatusChanged => {
            if event.payment_moved_to(PaymentStatus::Paid) {
                out.push(buyer_order_notification(
                    event,
                    "Payment confirmed",
                    format!("Payment for order #{} has been confirmed.", order_ref),
                    NotificationLevel::Success,
                ));
            } else if let Some(status) = event.order_status_change() {
                let (title, message, level) = status_phrase(status, &order_ref);
                out.push(buyer_order_notification(event, title, message, level));
            }

            if event.payment_moved_to(PaymentStatus::AwaitingConfirmation) && admin_id != event.buyer_id {
                out.push(admin_order_notification(
                    admin_id,
                    event,
                    "Payment awaiting confirmation",
                    format!(
                        "Order #{} is awaiting payment confirmation: {} with unique code {}.",
                        order_ref,
                        format_amount(event.total_amount + i64::from(event.payment_unique_code)),
                        event.payment_unique_code
                    ),
                ));
            }
        }
    }
    out
}

/// The notification for the receiver of a chat message.
pub fn chat_message_notification(message: &ChatMessage, admin_id: Uuid) -> NewNotification {
    let receiver_is_admin = message.receiver_id == admin_id;
    let link = match (message.order_id, message.product_id) {
        (Some(order_id), _) if receiver_is_admin => routes::admin_order_detail(order_id),
        (Some(order_id), _) => routes::order_detail(order_id),
        (None, Some(product_id)) => routes::product_detail(product_id),
        (None, None) if receiver_is_admin => routes::admin_chat(message.sender_id),
        (None, None) => routes::chat(),
    };
    let preview: String = message.message.chars().take(80).collect();
    NewNotification {
        user_id: message.receiver_id,
        title: "New message".to_string(),
        message: preview,
        link: Some(link),
        product_id: message.product_id,
        order_id: message.order_id,
        level: NotificationLevel::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderState;

    fn event(kind: OrderEventKind, old: Option<OrderState>, new: OrderState) -> OrderEvent {
        OrderEvent {
            order_id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            kind,
            old_state: old,
            new_state: new,
            payment_unique_code: 123,
            total_amount: 130_000,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn amounts_group_by_thousands() {
        assert_eq!(format_amount(0), "Rp 0");
        assert_eq!(format_amount(999), "Rp 999");
        assert_eq!(format_amount(130_123), "Rp 130.123");
        assert_eq!(format_amount(1_000_000), "Rp 1.000.000");
    }

    #[test]
    fn created_notifies_buyer_and_admin() {
        let admin = Uuid::new_v4();
        let ev = event(OrderEventKind::Created, None, OrderState::NEW);
        let out = order_event_notifications(&ev, admin);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].user_id, ev.buyer_id);
        assert_eq!(out[0].link.as_deref(), Some(routes::order_detail(ev.order_id).as_str()));
        assert!(out[0].message.contains("Rp 130.123"));
        assert_eq!(out[1].user_id, admin);
        assert_eq!(out[1].link.as_deref(), Some(routes::admin_order_detail(ev.order_id).as_str()));
    }

    #[test]
    fn confirmation_yields_a_single_payment_confirmed() {
        let ev = event(
            OrderEventKind::StatusChanged,
            Some(OrderState::new(OrderStatus::Pending, PaymentStatus::AwaitingConfirmation)),
            OrderState::new(OrderStatus::Processing, PaymentStatus::Paid),
        );
        let out = order_event_notifications(&ev, Uuid::new_v4());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Payment confirmed");
        assert_eq!(out[0].user_id, ev.buyer_id);
    }

    #[test]
    fn selecting_a_method_only_notifies_admin_with_code() {
        let admin = Uuid::new_v4();
        let ev = event(
            OrderEventKind::StatusChanged,
            Some(OrderState::NEW),
            OrderState::new(OrderStatus::Pending, PaymentStatus::AwaitingConfirmation),
        );
        let out = order_event_notifications(&ev, admin);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].user_id, admin);
        assert!(out[0].message.contains("123"));
    }

    #[test]
    fn cancellation_uses_error_level() {
        let ev = event(
            OrderEventKind::StatusChanged,
            Some(OrderState::new(OrderStatus::Processing, PaymentStatus::Paid)),
            OrderState::new(OrderStatus::Cancelled, PaymentStatus::Refunded),
        );
        let out = order_event_notifications(&ev, Uuid::new_v4());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Order cancelled");
        assert_eq!(out[0].level, NotificationLevel::Error);
    }

    #[test]
    fn chat_links_follow_context() {
        let admin = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        let order_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();
        let mut msg = ChatMessage {
            id: Uuid::new_v4(),
            sender_id: buyer,
            receiver_id: admin,
            product_id: Some(product_id),
            order_id: Some(order_id),
            message: "Is this still available?".to_string(),
            is_read: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(chat_message_notification(&msg, admin).link, Some(routes::admin_order_detail(order_id)));

        msg.order_id = None;
        assert_eq!(chat_message_notification(&msg, admin).link, Some(routes::product_detail(product_id)));

        msg.product_id = None;
        assert_eq!(chat_message_notification(&msg, admin).link, Some(routes::admin_chat(buyer)));

        msg.sender_id = admin;
        msg.receiver_id = buyer;
        let to_buyer = chat_message_notification(&msg, admin);
        assert_eq!(to_buyer.user_id, buyer);
        assert_eq!(to_buyer.link, Some(routes::chat()));
    }
}
