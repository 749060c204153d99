// storefront_core/src/order/event.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregate::Order;
use super::status::{OrderState, OrderStatus, PaymentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEventKind {
    Created,
    StatusChanged,
}

/// Emitted by the order service after every successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub order_id: Uuid,
    pub buyer_id: Uuid,
    pub kind: OrderEventKind,
    pub old_state: Option<OrderState>,
    pub new_state: OrderState,
    pub payment_unique_code: i32,
    pub total_amount: i64,
    pub occurred_at: DateTime<Utc>,
}

impl OrderEvent {
    pub fn created(order: &Order) -> Self {
        Self {
            order_id: order.id,
            buyer_id: order.buyer_id,
            kind: OrderEventKind::Created,
            old_state: None,
            new_state: order.state(),
            payment_unique_code: order.payment_unique_code,
            total_amount: order.total_amount,
            occurred_at: order.created_at,
        }
    }

    pub fn status_changed(old_state: OrderState, order: &Order) -> Self {
        Self {
            order_id: order.id,
            buyer_id: order.buyer_id,
            kind: OrderEventKind::StatusChanged,
            old_state: Some(old_state),
            new_state: order.state(),
            payment_unique_code: order.payment_unique_code,
            total_amount: order.total_amount,
            occurred_at: order.updated_at,
        }
    }

    /// The new order status, if this event changed it.
    pub fn order_status_change(&self) -> Option<OrderStatus> {
        match self.old_state {
            Some(old) if old.order_status != self.new_state.order_status => Some(self.new_state.order_status),
            _ => None,
        }
    }

    /// True when this event moved the payment status into `status`.
    pub fn payment_moved_to(&self, status: PaymentStatus) -> bool {
        matches!(self.old_state, Some(old) if old.payment_status != status && self.new_state.payment_status == status)
    }
}
