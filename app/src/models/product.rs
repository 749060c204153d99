// storefront_app/src/models/product.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use storefront_core::{Product, Profile};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub price: i64,
  pub image_url: Option<String>,
  pub stock_quantity: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      name: row.name,
      description: row.description,
      price: row.price,
      image_url: row.image_url,
      stock_quantity: row.stock_quantity,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
  pub id: Uuid,
  pub full_name: String,
  pub email: Option<String>,
  pub phone: Option<String>,
}

impl From<ProfileRow> for Profile {
  fn from(row: ProfileRow) -> Self {
    Profile {
      id: row.id,
      full_name: row.full_name,
      email: row.email,
      phone: row.phone,
    }
  }
}
