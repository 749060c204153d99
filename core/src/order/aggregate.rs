// storefront_core/src/order/aggregate.rs

//! The order aggregate: line item snapshots, totals, the unique payment code
//! and the state machine over [`OrderState`].

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::status::{OrderState, OrderStatus, PaymentStatus};
use crate::catalog::Product;
use crate::error::{ShopError, ShopResult};

/// Inclusive bounds of the unique payment code.
pub const UNIQUE_CODE_MIN: i32 = 100;
pub const UNIQUE_CODE_MAX: i32 = 999;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub recipient_name: String,
    pub address: String,
    pub sub_district: String,
    pub district: String,
    pub phone: String,
}

impl ShippingInfo {
    pub fn validate(&self) -> ShopResult<()> {
        let fields = [
            ("recipient_name", &self.recipient_name),
            ("address", &self.address),
            ("sub_district", &self.sub_district),
            ("district", &self.district),
            ("phone", &self.phone),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ShopError::Validation(format!("Shipping field '{}' is required", name)));
            }
        }
        Ok(())
    }
}

/// One line of a submitted cart. Prices come from the catalog, not the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub total_amount: i64,
    pub payment_unique_code: i32,
    pub shipping: ShippingInfo,
    pub payment_method_id: Option<Uuid>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn state(&self) -> OrderState {
        OrderState::new(self.order_status, self.payment_status)
    }

    /// Amount the buyer transfers: the total with the unique code appended.
    pub fn payable_amount(&self) -> i64 {
        self.total_amount + i64::from(self.payment_unique_code)
    }
}

/// Immutable line item. Name, price and image are copied from the product at
/// purchase time so later catalog edits do not alter historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_purchase: i64,
    pub product_name: String,
    pub product_image: Option<String>,
}

impl OrderItem {
    pub fn subtotal(&self) -> Option<i64> {
        self.price_at_purchase.checked_mul(i64::from(self.quantity))
    }
}

/// An order and its items, ready to be written in one backend call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

pub fn generate_unique_code<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(UNIQUE_CODE_MIN..=UNIQUE_CODE_MAX)
}

/// Validates a cart submission and snapshots it into a pending, unpaid order.
pub fn draft_order(
    buyer_id: Uuid,
    lines: &[CartLine],
    shipping: ShippingInfo,
    products: &HashMap<Uuid, Product>,
    payment_unique_code: i32,
    now: DateTime<Utc>,
) -> ShopResult<NewOrder> {
    if lines.is_empty() {
        return Err(ShopError::Validation("Cart is empty".to_string()));
    }
    shipping.validate()?;
    if !(UNIQUE_CODE_MIN..=UNIQUE_CODE_MAX).contains(&payment_unique_code) {
        return Err(ShopError::Validation(format!(
            "Unique payment code {} is outside {}..={}",
            payment_unique_code, UNIQUE_CODE_MIN, UNIQUE_CODE_MAX
        )));
    }

    let order_id = Uuid::new_v4();
    let mut items = Vec::with_capacity(lines.len());
    let mut total: i64 = 0;
    for line in lines {
        if line.quantity < 1 {
            return Err(ShopError::Validation(format!(
                "Quantity for product {} must be at least 1",
                line.product_id
            )));
        }
        let product = products
            .get(&line.product_id)
            .ok_or_else(|| ShopError::Validation(format!("Product {} does not exist", line.product_id)))?;
        let item = OrderItem {
            id: Uuid::new_v4(),
            order_id,
            product_id: product.id,
            quantity: line.quantity,
            price_at_purchase: product.price,
            product_name: product.name.clone(),
            product_image: product.image_url.clone(),
        };
        total = item
            .subtotal()
            .and_then(|subtotal| total.checked_add(subtotal))
            .ok_or_else(|| ShopError::Validation("Order total overflows".to_string()))?;
        items.push(item);
    }

    let order = Order {
        id: order_id,
        buyer_id,
        total_amount: total,
        payment_unique_code,
        shipping,
        payment_method_id: None,
        order_status: OrderState::NEW.order_status,
        payment_status: OrderState::NEW.payment_status,
        created_at: now,
        updated_at: now,
    };
    Ok(NewOrder { order, items })
}

/// Named transitions of the order state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    SelectPaymentMethod,
    ConfirmPayment,
    Complete,
    Cancel,
}

impl Transition {
    pub fn name(self) -> &'static str {
        match self {
            Transition::SelectPaymentMethod => "select payment method",
            Transition::ConfirmPayment => "confirm payment",
            Transition::Complete => "complete order",
            Transition::Cancel => "cancel order",
        }
    }

    pub fn target(self) -> OrderState {
        match self {
            Transition::SelectPaymentMethod => {
                OrderState::new(OrderStatus::Pending, PaymentStatus::AwaitingConfirmation)
            }
            Transition::ConfirmPayment => OrderState::new(OrderStatus::Processing, PaymentStatus::Paid),
            Transition::Complete => OrderState::new(OrderStatus::Completed, PaymentStatus::Paid),
            Transition::Cancel => OrderState::new(OrderStatus::Cancelled, PaymentStatus::Refunded),
        }
    }
}

impl OrderState {
    /// The transition table. Anything not listed here is rejected.
    pub fn can_transition_to(&self, target: OrderState) -> bool {
        use OrderStatus as O;
        use PaymentStatus as P;
        matches!(
            (self.order_status, self.payment_status, target.order_status, target.payment_status),
            (O::Pending, P::Unpaid, O::Pending, P::AwaitingConfirmation)
                | (O::Pending, P::AwaitingConfirmation, O::Processing, P::Paid)
                | (O::Processing, P::Paid, O::Completed, P::Paid)
                | (O::Pending, P::Unpaid | P::AwaitingConfirmation, O::Cancelled, P::Refunded)
                | (O::Processing, P::Paid, O::Cancelled, P::Refunded)
        )
    }

    pub fn apply(self, transition: Transition) -> ShopResult<OrderState> {
        let target = transition.target();
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(ShopError::invalid_state(transition.name(), self))
        }
    }

    /// Resolves an admin status update into a full target state. A missing
    /// payment status is implied by the order status so the pair never drifts.
    pub fn resolve_update(self, order_status: OrderStatus, payment_status: Option<PaymentStatus>) -> ShopResult<OrderState> {
        let operation = format!("update order status to {}", order_status);
        if order_status == self.order_status {
            return Err(ShopError::invalid_state(operation, self));
        }
        let implied = match order_status {
            OrderStatus::Processing => PaymentStatus::Paid,
            OrderStatus::Cancelled => PaymentStatus::Refunded,
            OrderStatus::Pending | OrderStatus::Completed => self.payment_status,
        };
        let target = OrderState::new(order_status, payment_status.unwrap_or(implied));
        if target.is_consistent() && self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(ShopError::invalid_state(operation, self))
        }
    }
}
