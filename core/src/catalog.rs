// storefront_core/src/catalog.rs

//! Catalog entities referenced by orders: products, buyer profiles and the
//! admin-managed payment methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ShopError, ShopResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image_url: Option<String>,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public part of a user account, joined into order projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Type-specific payment details, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum PaymentDetails {
    BankTransfer {
        bank_name: String,
        account_name: String,
        account_number: String,
    },
    EWallet {
        provider: String,
        #[serde(rename = "id")]
        account_id: String,
    },
    Card {
        card_type: String,
        last_four: String,
    },
    /// Free-form instructions for anything else.
    Other(String),
}

impl PaymentDetails {
    pub fn type_name(&self) -> &'static str {
        match self {
            PaymentDetails::BankTransfer { .. } => "bank_transfer",
            PaymentDetails::EWallet { .. } => "e_wallet",
            PaymentDetails::Card { .. } => "card",
            PaymentDetails::Other(_) => "other",
        }
    }

    pub fn validate(&self) -> ShopResult<()> {
        let required: Vec<(&str, &str)> = match self {
            PaymentDetails::BankTransfer {
                bank_name,
                account_name,
                account_number,
            } => vec![
                ("bank_name", bank_name.as_str()),
                ("account_name", account_name.as_str()),
                ("account_number", account_number.as_str()),
            ],
            PaymentDetails::EWallet { provider, account_id } => vec![("provider", provider.as_str()), ("id", account_id.as_str())],
            PaymentDetails::Card { card_type, last_four } => {
                if last_four.len() != 4 || !last_four.chars().all(|c| c.is_ascii_digit()) {
                    return Err(ShopError::Validation("Card last_four must be exactly 4 digits".to_string()));
                }
                vec![("card_type", card_type.as_str())]
            }
            PaymentDetails::Other(_) => Vec::new(),
        };
        match required.into_iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(ShopError::Validation(format!(
                "Payment detail '{}' is required for {}",
                field,
                self.type_name()
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub details: PaymentDetails,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin input for creating or replacing a payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodInput {
    pub name: String,
    #[serde(flatten)]
    pub details: PaymentDetails,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub display_order: i32,
}

fn default_active() -> bool {
    true
}

impl PaymentMethodInput {
    pub fn validate(&self) -> ShopResult<()> {
        if self.name.trim().is_empty() {
            return Err(ShopError::Validation("Payment method name is required".to_string()));
        }
        self.details.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn details_are_tagged_by_type() {
        let input: PaymentMethodInput = serde_json::from_value(json!({
            "name": "BCA",
            "type": "bank_transfer",
            "details": {"bank_name": "BCA", "account_name": "Toko Kita", "account_number": "1234567890"},
            "display_order": 1
        }))
        .unwrap();
        assert!(input.is_active);
        assert_eq!(input.details.type_name(), "bank_transfer");
        input.validate().unwrap();

        let other: PaymentDetails = serde_json::from_value(json!({"type": "other", "details": "Pay at the counter"})).unwrap();
        assert_eq!(other, PaymentDetails::Other("Pay at the counter".to_string()));
    }

    #[test]
    fn card_needs_four_digits() {
        let card = PaymentDetails::Card {
            card_type: "visa".to_string(),
            last_four: "12a4".to_string(),
        };
        assert!(card.validate().is_err());

        let wallet = PaymentDetails::EWallet {
            provider: "OVO".to_string(),
            account_id: " ".to_string(),
        };
        assert!(wallet.validate().is_err());
    }
}
