// storefront_app/src/models/payment_method.rs

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::FromRow;
use storefront_core::{PaymentDetails, PaymentMethod};
use uuid::Uuid;

/// `method_type` holds the serde tag, `details` the tagged content as JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentMethodRow {
  pub id: Uuid,
  pub name: String,
  pub method_type: String,
  pub details: Value,
  pub is_active: bool,
  pub display_order: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Splits the tagged union into its (type, details) columns.
pub fn split_details(details: &PaymentDetails) -> anyhow::Result<(String, Value)> {
  let mut value = serde_json::to_value(details).context("serializing payment details")?;
  let object = value
    .as_object_mut()
    .ok_or_else(|| anyhow!("payment details did not serialize to an object"))?;
  let method_type = object
    .remove("type")
    .and_then(|t| t.as_str().map(str::to_string))
    .ok_or_else(|| anyhow!("payment details carry no type tag"))?;
  let content = object.remove("details").unwrap_or(Value::Null);
  Ok((method_type, content))
}

impl TryFrom<PaymentMethodRow> for PaymentMethod {
  type Error = anyhow::Error;

  fn try_from(row: PaymentMethodRow) -> anyhow::Result<Self> {
    let details: PaymentDetails = serde_json::from_value(json!({
      "type": row.method_type,
      "details": row.details,
    }))
    .with_context(|| format!("decoding details of payment method {}", row.id))?;
    Ok(PaymentMethod {
      id: row.id,
      name: row.name,
      details,
      is_active: row.is_active,
      display_order: row.display_order,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn details_split_into_type_and_content() {
    let details = PaymentDetails::EWallet {
      provider: "GoPay".to_string(),
      account_id: "0812000111".to_string(),
    };
    let (method_type, content) = split_details(&details).unwrap();
    assert_eq!(method_type, "e_wallet");
    assert_eq!(content["provider"], "GoPay");

    let now = Utc::now();
    let row = PaymentMethodRow {
      id: Uuid::new_v4(),
      name: "GoPay".to_string(),
      method_type,
      details: content,
      is_active: true,
      display_order: 1,
      created_at: now,
      updated_at: now,
    };
    let method = PaymentMethod::try_from(row).unwrap();
    assert_eq!(method.details, details);
  }
}
