// storefront_app/src/db/orders.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use storefront_core::{NewOrder, Order, OrderBackend, OrderFilter, OrderItem, OrderState, StateUpdate};
use uuid::Uuid;

use super::PgBackend;
use crate::models::order::{ORDER_COLUMNS, ORDER_ITEM_COLUMNS};
use crate::models::{OrderItemRow, OrderRow};

#[async_trait]
impl OrderBackend for PgBackend {
  async fn insert_order(&self, new_order: &NewOrder) -> Result<()> {
    let order = &new_order.order;
    let mut tx = self.pool.begin().await.context("starting order transaction")?;

    sqlx::query(
      r#"
      INSERT INTO orders (id, buyer_id, total_amount, payment_unique_code, recipient_name, address,
        sub_district, district, phone, payment_method_id, order_status, payment_status, created_at, updated_at)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
      "#,
    )
    .bind(order.id)
    .bind(order.buyer_id)
    .bind(order.total_amount)
    .bind(order.payment_unique_code)
    .bind(&order.shipping.recipient_name)
    .bind(&order.shipping.address)
    .bind(&order.shipping.sub_district)
    .bind(&order.shipping.district)
    .bind(&order.shipping.phone)
    .bind(order.payment_method_id)
    .bind(order.order_status.as_str())
    .bind(order.payment_status.as_str())
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *tx)
    .await
    .with_context(|| format!("inserting order {}", order.id))?;

    for (line_no, item) in (0_i32..).zip(&new_order.items) {
      sqlx::query(
        r#"
        INSERT INTO order_items (id, order_id, line_no, product_id, quantity, price_at_purchase, product_name, product_image)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
      )
      .bind(item.id)
      .bind(item.order_id)
      .bind(line_no)
      .bind(item.product_id)
      .bind(item.quantity)
      .bind(item.price_at_purchase)
      .bind(&item.product_name)
      .bind(&item.product_image)
      .execute(&mut *tx)
      .await
      .with_context(|| format!("inserting items of order {}", order.id))?;
    }

    // Dropping `tx` on any error above rolls the order back.
    tx.commit().await.context("committing order transaction")?;
    Ok(())
  }

  async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await
      .with_context(|| format!("fetching order {}", order_id))?;
    row.map(Order::try_from).transpose()
  }

  async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      r#"
      SELECT {} FROM orders
      WHERE ($1::uuid IS NULL OR buyer_id = $1)
        AND ($2::text IS NULL OR order_status = $2)
        AND ($3::text IS NULL OR payment_status = $3)
      ORDER BY created_at DESC, id
      "#,
      ORDER_COLUMNS
    ))
    .bind(filter.buyer_id)
    .bind(filter.order_status.map(|s| s.as_str()))
    .bind(filter.payment_status.map(|s| s.as_str()))
    .fetch_all(&self.pool)
    .await
    .context("listing orders")?;
    rows.into_iter().map(Order::try_from).collect()
  }

  async fn list_items(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItem>> {
    let rows: Vec<OrderItemRow> = sqlx::query_as(&format!(
      "SELECT {} FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, line_no",
      ORDER_ITEM_COLUMNS
    ))
    .bind(order_ids)
    .fetch_all(&self.pool)
    .await
    .context("listing order items")?;
    Ok(rows.into_iter().map(OrderItem::from).collect())
  }

  async fn update_order_state(&self, order_id: Uuid, expected: OrderState, update: StateUpdate) -> Result<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
      r#"
      UPDATE orders
      SET order_status = $1, payment_status = $2,
          payment_method_id = COALESCE($3, payment_method_id), updated_at = $4
      WHERE id = $5 AND order_status = $6 AND payment_status = $7
      RETURNING {}
      "#,
      ORDER_COLUMNS
    ))
    .bind(update.new_state.order_status.as_str())
    .bind(update.new_state.payment_status.as_str())
    .bind(update.payment_method_id)
    .bind(update.at)
    .bind(order_id)
    .bind(expected.order_status.as_str())
    .bind(expected.payment_status.as_str())
    .fetch_optional(&self.pool)
    .await
    .with_context(|| format!("updating state of order {}", order_id))?;
    row.map(Order::try_from).transpose()
  }

  async fn delete_order(&self, order_id: Uuid) -> Result<bool> {
    let mut tx = self.pool.begin().await.context("starting delete transaction")?;
    sqlx::query("DELETE FROM order_items WHERE order_id = $1")
      .bind(order_id)
      .execute(&mut *tx)
      .await
      .with_context(|| format!("deleting items of order {}", order_id))?;
    let deleted = sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(order_id)
      .execute(&mut *tx)
      .await
      .with_context(|| format!("deleting order {}", order_id))?
      .rows_affected();
    tx.commit().await.context("committing delete transaction")?;
    Ok(deleted > 0)
  }
}
