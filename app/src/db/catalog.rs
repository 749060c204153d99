// storefront_app/src/db/catalog.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use storefront_core::{CatalogBackend, PaymentMethod, Product, Profile};
use uuid::Uuid;

use super::PgBackend;
use crate::models::payment_method::split_details;
use crate::models::{PaymentMethodRow, ProductRow, ProfileRow};

const PRODUCT_COLUMNS: &str = "id, name, description, price, image_url, stock_quantity, created_at, updated_at";
const PAYMENT_METHOD_COLUMNS: &str =
  "id, name, method_type, details, is_active, display_order, created_at, updated_at";

#[async_trait]
impl CatalogBackend for PgBackend {
  async fn list_products(&self) -> Result<Vec<Product>> {
    let rows: Vec<ProductRow> = sqlx::query_as(&format!("SELECT {} FROM products ORDER BY name ASC", PRODUCT_COLUMNS))
      .fetch_all(&self.pool)
      .await
      .context("listing products")?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  async fn get_products(&self, product_ids: &[Uuid]) -> Result<Vec<Product>> {
    let rows: Vec<ProductRow> =
      sqlx::query_as(&format!("SELECT {} FROM products WHERE id = ANY($1)", PRODUCT_COLUMNS))
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await
        .context("fetching products")?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  async fn get_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>> {
    let rows: Vec<ProfileRow> = sqlx::query_as("SELECT id, full_name, email, phone FROM profiles WHERE id = ANY($1)")
      .bind(user_ids)
      .fetch_all(&self.pool)
      .await
      .context("fetching profiles")?;
    Ok(rows.into_iter().map(Profile::from).collect())
  }

  async fn list_payment_methods(&self, active_only: bool) -> Result<Vec<PaymentMethod>> {
    let rows: Vec<PaymentMethodRow> = sqlx::query_as(&format!(
      "SELECT {} FROM payment_methods WHERE (NOT $1 OR is_active) ORDER BY display_order, name",
      PAYMENT_METHOD_COLUMNS
    ))
    .bind(active_only)
    .fetch_all(&self.pool)
    .await
    .context("listing payment methods")?;
    rows.into_iter().map(PaymentMethod::try_from).collect()
  }

  async fn get_payment_method(&self, method_id: Uuid) -> Result<Option<PaymentMethod>> {
    let row: Option<PaymentMethodRow> =
      sqlx::query_as(&format!("SELECT {} FROM payment_methods WHERE id = $1", PAYMENT_METHOD_COLUMNS))
        .bind(method_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("fetching payment method {}", method_id))?;
    row.map(PaymentMethod::try_from).transpose()
  }

  async fn insert_payment_method(&self, method: &PaymentMethod) -> Result<()> {
    let (method_type, details) = split_details(&method.details)?;
    sqlx::query(
      r#"
      INSERT INTO payment_methods (id, name, method_type, details, is_active, display_order, created_at, updated_at)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
      "#,
    )
    .bind(method.id)
    .bind(&method.name)
    .bind(method_type)
    .bind(details)
    .bind(method.is_active)
    .bind(method.display_order)
    .bind(method.created_at)
    .bind(method.updated_at)
    .execute(&self.pool)
    .await
    .with_context(|| format!("inserting payment method '{}'", method.name))?;
    Ok(())
  }

  async fn update_payment_method(&self, method: &PaymentMethod) -> Result<bool> {
    let (method_type, details) = split_details(&method.details)?;
    let updated = sqlx::query(
      r#"
      UPDATE payment_methods
      SET name = $2, method_type = $3, details = $4, is_active = $5, display_order = $6, updated_at = $7
      WHERE id = $1
      "#,
    )
    .bind(method.id)
    .bind(&method.name)
    .bind(method_type)
    .bind(details)
    .bind(method.is_active)
    .bind(method.display_order)
    .bind(method.updated_at)
    .execute(&self.pool)
    .await
    .with_context(|| format!("updating payment method {}", method.id))?
    .rows_affected();
    Ok(updated > 0)
  }
}
