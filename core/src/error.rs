// storefront_core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;
use uuid::Uuid;

use crate::order::OrderState;

#[derive(Debug, Error)]
pub enum ShopError {
    /// Malformed input: empty cart, blank shipping field, unknown product.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation is not allowed from the resource's current state.
    #[error("Invalid state for {operation}: order is {current}")]
    InvalidState { operation: String, current: OrderState },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: Uuid },

    /// The order and its line items could not be written together.
    #[error("Order creation failed. Source: {source}")]
    OrderCreationFailed {
        #[source]
        source: AnyhowError,
    },

    /// The backend collaborator returned an error. Treated as opaque.
    #[error("Upstream failure: {source}")]
    Upstream {
        #[source]
        source: AnyhowError,
    },
}

impl ShopError {
    pub fn invalid_state(operation: impl Into<String>, current: OrderState) -> Self {
        ShopError::InvalidState {
            operation: operation.into(),
            current,
        }
    }

    pub fn not_found(resource: &'static str, id: Uuid) -> Self {
        ShopError::NotFound { resource, id }
    }
}

// Backend implementations report failures as anyhow errors; everything that
// reaches a service through `?` is an upstream failure.
impl From<AnyhowError> for ShopError {
    fn from(err: AnyhowError) -> Self {
        match err.downcast::<ShopError>() {
            Ok(shop_err) => shop_err,
            Err(err) => ShopError::Upstream { source: err },
        }
    }
}

pub type ShopResult<T, E = ShopError> = std::result::Result<T, E>;
