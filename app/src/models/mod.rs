// storefront_app/src/models/mod.rs

//! Row types as stored in PostgreSQL, converted into the domain types of
//! `storefront_core` at the backend boundary.

pub mod chat_message;
pub mod notification;
pub mod order;
pub mod payment_method;
pub mod product;

pub use chat_message::ChatMessageRow;
pub use notification::NotificationRow;
pub use order::{OrderItemRow, OrderRow};
pub use payment_method::PaymentMethodRow;
pub use product::{ProductRow, ProfileRow};
