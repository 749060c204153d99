// storefront_core/src/order/status.rs

//! The two independent status fields of an order and their combined state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ShopError;

/// Fulfillment state. Payment-related values live only in [`PaymentStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    AwaitingConfirmation,
    Paid,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Unpaid,
        PaymentStatus::AwaitingConfirmation,
        PaymentStatus::Paid,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::AwaitingConfirmation => "awaiting_confirmation",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ShopError::Validation(format!("Unknown order status '{}'", s)))
    }
}

impl FromStr for PaymentStatus {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ShopError::Validation(format!("Unknown payment status '{}'", s)))
    }
}

/// Both status fields of an order. They are always read and written as a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderState {
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

impl OrderState {
    /// State of a freshly submitted order.
    pub const NEW: OrderState = OrderState::new(OrderStatus::Pending, PaymentStatus::Unpaid);

    pub const fn new(order_status: OrderStatus, payment_status: PaymentStatus) -> Self {
        Self {
            order_status,
            payment_status,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.order_status.is_terminal()
    }

    /// processing requires paid, and paid requires processing or completed.
    pub fn is_consistent(&self) -> bool {
        use OrderStatus as O;
        use PaymentStatus as P;
        match (self.order_status, self.payment_status) {
            (O::Pending, P::Unpaid | P::AwaitingConfirmation) => true,
            (O::Processing, P::Paid) => true,
            (O::Completed, P::Paid) => true,
            (O::Cancelled, P::Refunded) => true,
            _ => false,
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.order_status, self.payment_status)
    }
}
