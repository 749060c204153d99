// storefront_core/src/backend/memory.rs

//! In-process backend used by tests and `STORAGE_BACKEND=memory` runs.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use super::{CatalogBackend, ChatBackend, NotificationBackend, OrderBackend, OrderFilter, StateUpdate};
use crate::catalog::{PaymentMethod, Product, Profile};
use crate::chat::{ChatMessage, ThreadScope};
use crate::notification::Notification;
use crate::order::{NewOrder, Order, OrderItem, OrderState};

#[derive(Debug, Default)]
struct Tables {
    orders: HashMap<Uuid, Order>,
    // Insertion order is kept so equal timestamps still read back stably.
    order_items: Vec<OrderItem>,
    products: HashMap<Uuid, Product>,
    profiles: HashMap<Uuid, Profile>,
    payment_methods: HashMap<Uuid, PaymentMethod>,
    notifications: Vec<Notification>,
    messages: Vec<ChatMessage>,
}

/// All tables behind one lock. Guards are never held across an `.await`.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
    fail_order_writes: AtomicBool,
    fail_notification_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_product(&self, product: Product) {
        self.tables.write().products.insert(product.id, product);
    }

    pub fn seed_profile(&self, profile: Profile) {
        self.tables.write().profiles.insert(profile.id, profile);
    }

    /// Makes `insert_order` fail until reset, as an unreachable backend would.
    pub fn set_fail_order_writes(&self, fail: bool) {
        self.fail_order_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_notification_writes(&self, fail: bool) {
        self.fail_notification_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes the list and count reads fail until reset.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("backend unavailable"));
        }
        Ok(())
    }

    pub fn order_item_count(&self, order_id: Uuid) -> usize {
        self.tables.read().order_items.iter().filter(|i| i.order_id == order_id).count()
    }
}

#[async_trait]
impl OrderBackend for MemoryBackend {
    async fn insert_order(&self, new_order: &NewOrder) -> Result<()> {
        if self.fail_order_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("order_items insert rejected by backend"));
        }
        let mut tables = self.tables.write();
        if tables.orders.contains_key(&new_order.order.id) {
            return Err(anyhow!("duplicate order id {}", new_order.order.id));
        }
        tables.orders.insert(new_order.order.id, new_order.order.clone());
        tables.order_items.extend(new_order.items.iter().cloned());
        Ok(())
    }

    async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>> {
        Ok(self.tables.read().orders.get(&order_id).cloned())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        self.check_reads()?;
        let tables = self.tables.read();
        let mut orders: Vec<Order> = tables.orders.values().filter(|o| filter.matches(o)).cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(orders)
    }

    async fn list_items(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItem>> {
        let tables = self.tables.read();
        Ok(
            tables
                .order_items
                .iter()
                .filter(|item| order_ids.contains(&item.order_id))
                .cloned()
                .collect(),
        )
    }

    async fn update_order_state(&self, order_id: Uuid, expected: OrderState, update: StateUpdate) -> Result<Option<Order>> {
        let mut tables = self.tables.write();
        let Some(order) = tables.orders.get_mut(&order_id) else {
            return Ok(None);
        };
        if order.state() != expected {
            return Ok(None);
        }
        order.order_status = update.new_state.order_status;
        order.payment_status = update.new_state.payment_status;
        if let Some(method_id) = update.payment_method_id {
            order.payment_method_id = Some(method_id);
        }
        order.updated_at = update.at;
        Ok(Some(order.clone()))
    }

    async fn delete_order(&self, order_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write();
        tables.order_items.retain(|item| item.order_id != order_id);
        Ok(tables.orders.remove(&order_id).is_some())
    }
}

#[async_trait]
impl CatalogBackend for MemoryBackend {
    async fn list_products(&self) -> Result<Vec<Product>> {
        self.check_reads()?;
        let mut products: Vec<Product> = self.tables.read().products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn get_products(&self, product_ids: &[Uuid]) -> Result<Vec<Product>> {
        let tables = self.tables.read();
        Ok(product_ids.iter().filter_map(|id| tables.products.get(id).cloned()).collect())
    }

    async fn get_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>> {
        let tables = self.tables.read();
        Ok(user_ids.iter().filter_map(|id| tables.profiles.get(id).cloned()).collect())
    }

    async fn list_payment_methods(&self, active_only: bool) -> Result<Vec<PaymentMethod>> {
        let mut methods: Vec<PaymentMethod> = self
            .tables
            .read()
            .payment_methods
            .values()
            .filter(|m| !active_only || m.is_active)
            .cloned()
            .collect();
        methods.sort_by(|a, b| a.display_order.cmp(&b.display_order).then_with(|| a.name.cmp(&b.name)));
        Ok(methods)
    }

    async fn get_payment_method(&self, method_id: Uuid) -> Result<Option<PaymentMethod>> {
        Ok(self.tables.read().payment_methods.get(&method_id).cloned())
    }

    async fn insert_payment_method(&self, method: &PaymentMethod) -> Result<()> {
        self.tables.write().payment_methods.insert(method.id, method.clone());
        Ok(())
    }

    async fn update_payment_method(&self, method: &PaymentMethod) -> Result<bool> {
        let mut tables = self.tables.write();
        match tables.payment_methods.get_mut(&method.id) {
            Some(existing) => {
                *existing = PaymentMethod {
                    created_at: existing.created_at,
                    ..method.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl NotificationBackend for MemoryBackend {
    async fn insert_notification(&self, notification: &Notification) -> Result<()> {
        if self.fail_notification_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("notifications insert rejected by backend"));
        }
        self.tables.write().notifications.push(notification.clone());
        Ok(())
    }

    async fn list_notifications(&self, user_id: Uuid, limit: i64) -> Result<Vec<Notification>> {
        self.check_reads()?;
        let tables = self.tables.read();
        let mut rows: Vec<Notification> = tables.notifications.iter().filter(|n| n.user_id == user_id).cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        rows.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn get_notification(&self, notification_id: Uuid) -> Result<Option<Notification>> {
        Ok(
            self
                .tables
                .read()
                .notifications
                .iter()
                .find(|n| n.id == notification_id)
                .cloned(),
        )
    }

    async fn count_unread_notifications(&self, user_id: Uuid) -> Result<i64> {
        self.check_reads()?;
        let tables = self.tables.read();
        let count = tables.notifications.iter().filter(|n| n.user_id == user_id && !n.is_read).count();
        Ok(i64::try_from(count)?)
    }

    async fn mark_notification_read(&self, notification_id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let mut tables = self.tables.write();
        match tables.notifications.iter_mut().find(|n| n.id == notification_id) {
            Some(n) => {
                n.is_read = true;
                n.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<u64> {
        let mut tables = self.tables.write();
        let mut changed = 0;
        for n in tables.notifications.iter_mut().filter(|n| n.user_id == user_id && !n.is_read) {
            n.is_read = true;
            n.updated_at = at;
            changed += 1;
        }
        Ok(changed)
    }
}

#[async_trait]
impl ChatBackend for MemoryBackend {
    async fn insert_message(&self, message: &ChatMessage) -> Result<()> {
        self.tables.write().messages.push(message.clone());
        Ok(())
    }

    async fn list_thread(&self, user_a: Uuid, user_b: Uuid, scope: ThreadScope) -> Result<Vec<ChatMessage>> {
        self.check_reads()?;
        let tables = self.tables.read();
        let mut thread: Vec<ChatMessage> = tables
            .messages
            .iter()
            .filter(|m| m.involves(user_a, user_b) && scope.matches(m))
            .cloned()
            .collect();
        thread.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(thread)
    }

    async fn list_messages_for(&self, user_id: Uuid) -> Result<Vec<ChatMessage>> {
        self.check_reads()?;
        let tables = self.tables.read();
        let mut messages: Vec<ChatMessage> = tables
            .messages
            .iter()
            .filter(|m| m.sender_id == user_id || m.receiver_id == user_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn mark_thread_read(&self, reader_id: Uuid, sender_id: Uuid, scope: ThreadScope, at: DateTime<Utc>) -> Result<u64> {
        let mut tables = self.tables.write();
        let mut changed = 0;
        for m in tables
            .messages
            .iter_mut()
            .filter(|m| m.receiver_id == reader_id && m.sender_id == sender_id && !m.is_read && scope.matches(m))
        {
            m.is_read = true;
            m.updated_at = at;
            changed += 1;
        }
        Ok(changed)
    }

    async fn count_unread_messages(&self, user_id: Uuid) -> Result<i64> {
        self.check_reads()?;
        let tables = self.tables.read();
        let count = tables.messages.iter().filter(|m| m.receiver_id == user_id && !m.is_read).count();
        Ok(i64::try_from(count)?)
    }
}
