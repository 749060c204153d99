// storefront_app/src/models/order.rs

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use storefront_core::{Order, OrderItem, OrderStatus, PaymentStatus, ShippingInfo};
use uuid::Uuid;

pub const ORDER_COLUMNS: &str = "id, buyer_id, total_amount, payment_unique_code, recipient_name, address, \
  sub_district, district, phone, payment_method_id, order_status, payment_status, created_at, updated_at";

pub const ORDER_ITEM_COLUMNS: &str =
  "id, order_id, product_id, quantity, price_at_purchase, product_name, product_image";

/// Statuses are stored as text and parsed on the way out.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
  pub id: Uuid,
  pub buyer_id: Uuid,
  pub total_amount: i64,
  pub payment_unique_code: i32,
  pub recipient_name: String,
  pub address: String,
  pub sub_district: String,
  pub district: String,
  pub phone: String,
  pub payment_method_id: Option<Uuid>,
  pub order_status: String,
  pub payment_status: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
  type Error = anyhow::Error;

  fn try_from(row: OrderRow) -> anyhow::Result<Self> {
    // Unparseable statuses surface as backend failures.
    let order_status = row
      .order_status
      .parse::<OrderStatus>()
      .map_err(|e| anyhow!("order {} has an unreadable order_status: {}", row.id, e))?;
    let payment_status = row
      .payment_status
      .parse::<PaymentStatus>()
      .map_err(|e| anyhow!("order {} has an unreadable payment_status: {}", row.id, e))?;
    Ok(Order {
      id: row.id,
      buyer_id: row.buyer_id,
      total_amount: row.total_amount,
      payment_unique_code: row.payment_unique_code,
      shipping: ShippingInfo {
        recipient_name: row.recipient_name,
        address: row.address,
        sub_district: row.sub_district,
        district: row.district,
        phone: row.phone,
      },
      payment_method_id: row.payment_method_id,
      order_status,
      payment_status,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_at_purchase: i64,
  pub product_name: String,
  pub product_image: Option<String>,
}

impl From<OrderItemRow> for OrderItem {
  fn from(row: OrderItemRow) -> Self {
    OrderItem {
      id: row.id,
      order_id: row.order_id,
      product_id: row.product_id,
      quantity: row.quantity,
      price_at_purchase: row.price_at_purchase,
      product_name: row.product_name,
      product_image: row.product_image,
    }
  }
}
