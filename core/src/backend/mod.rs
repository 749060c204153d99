// storefront_core/src/backend/mod.rs

//! The persistence collaborator, as consumed by the services.
//!
//! Implementations report failures as `anyhow::Error`; services surface them
//! as [`ShopError::Upstream`](crate::error::ShopError::Upstream). Each method
//! is one logical statement against the backend.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::catalog::{PaymentMethod, Product, Profile};
use crate::chat::{ChatMessage, ThreadScope};
use crate::notification::Notification;
use crate::order::{NewOrder, Order, OrderItem, OrderState, OrderStatus, PaymentStatus};

pub mod memory;

pub use memory::MemoryBackend;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderFilter {
    pub buyer_id: Option<Uuid>,
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl OrderFilter {
    pub fn for_buyer(buyer_id: Uuid) -> Self {
        Self {
            buyer_id: Some(buyer_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.buyer_id.map_or(true, |id| order.buyer_id == id)
            && self.order_status.map_or(true, |s| order.order_status == s)
            && self.payment_status.map_or(true, |s| order.payment_status == s)
    }
}

/// A status write. Both fields of the state are always written together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateUpdate {
    pub new_state: OrderState,
    /// Set alongside the state when the buyer picks a payment method.
    pub payment_method_id: Option<Uuid>,
    pub at: DateTime<Utc>,
}

#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Writes the order and all of its items, or nothing.
    async fn insert_order(&self, new_order: &NewOrder) -> Result<()>;

    async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>>;

    /// Newest first.
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>>;

    /// Items of each order in the order their cart lines were submitted.
    async fn list_items(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItem>>;

    /// Compare-and-set: applies `update` only if the order is still in
    /// `expected`. Returns the updated order, or `None` when nothing matched.
    async fn update_order_state(&self, order_id: Uuid, expected: OrderState, update: StateUpdate) -> Result<Option<Order>>;

    /// Deletes the items, then the order. Returns false if the order was absent.
    async fn delete_order(&self, order_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Ordered by name.
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn get_products(&self, product_ids: &[Uuid]) -> Result<Vec<Product>>;

    async fn get_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>>;

    /// Ordered by display order, then name.
    async fn list_payment_methods(&self, active_only: bool) -> Result<Vec<PaymentMethod>>;

    async fn get_payment_method(&self, method_id: Uuid) -> Result<Option<PaymentMethod>>;

    async fn insert_payment_method(&self, method: &PaymentMethod) -> Result<()>;

    /// Replaces every mutable field. Returns false if the method was absent.
    async fn update_payment_method(&self, method: &PaymentMethod) -> Result<bool>;
}

#[async_trait]
pub trait NotificationBackend: Send + Sync {
    async fn insert_notification(&self, notification: &Notification) -> Result<()>;

    /// Newest first.
    async fn list_notifications(&self, user_id: Uuid, limit: i64) -> Result<Vec<Notification>>;

    async fn get_notification(&self, notification_id: Uuid) -> Result<Option<Notification>>;

    async fn count_unread_notifications(&self, user_id: Uuid) -> Result<i64>;

    async fn mark_notification_read(&self, notification_id: Uuid, at: DateTime<Utc>) -> Result<bool>;

    async fn mark_all_notifications_read(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<u64>;
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn insert_message(&self, message: &ChatMessage) -> Result<()>;

    /// Messages between the pair within `scope`, oldest first.
    async fn list_thread(&self, user_a: Uuid, user_b: Uuid, scope: ThreadScope) -> Result<Vec<ChatMessage>>;

    /// Every message `user_id` sent or received, oldest first.
    async fn list_messages_for(&self, user_id: Uuid) -> Result<Vec<ChatMessage>>;

    /// Flips `is_read` on messages from `sender_id` to `reader_id` within `scope`.
    async fn mark_thread_read(&self, reader_id: Uuid, sender_id: Uuid, scope: ThreadScope, at: DateTime<Utc>) -> Result<u64>;

    async fn count_unread_messages(&self, user_id: Uuid) -> Result<i64>;
}

/// Handles to every collaborator a service may need.
#[derive(Clone)]
pub struct Backends {
    pub orders: Arc<dyn OrderBackend>,
    pub catalog: Arc<dyn CatalogBackend>,
    pub notifications: Arc<dyn NotificationBackend>,
    pub chat: Arc<dyn ChatBackend>,
}

impl Backends {
    /// All four handles backed by one implementation.
    pub fn from_shared<B>(backend: Arc<B>) -> Self
    where
        B: OrderBackend + CatalogBackend + NotificationBackend + ChatBackend + 'static,
    {
        Self {
            orders: backend.clone(),
            catalog: backend.clone(),
            notifications: backend.clone(),
            chat: backend,
        }
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends").finish_non_exhaustive()
    }
}
