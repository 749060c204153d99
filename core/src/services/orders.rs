// storefront_core/src/services/orders.rs

//! Order Service: cart submission, the payment selection flow, status
//! transitions and read projections.

use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::degrade_read;
use crate::actor::Actor;
use crate::backend::{CatalogBackend, OrderBackend, OrderFilter, StateUpdate};
use crate::catalog::{PaymentMethod, Profile};
use crate::error::{ShopError, ShopResult};
use crate::order::{
    draft_order, generate_unique_code, CartLine, NewOrder, Order, OrderEvent, OrderItem, OrderState, OrderStatus,
    PaymentStatus, ShippingInfo, Transition,
};
use crate::realtime::Realtime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemView {
    #[serde(flatten)]
    pub item: OrderItem,
    /// Snapshot image, or the product's current image when no snapshot exists.
    pub image_url: Option<String>,
    /// `None` when price times quantity does not fit in an `i64`.
    pub subtotal: Option<i64>,
}

impl OrderItemView {
    fn new(item: OrderItem, live_images: &HashMap<Uuid, Option<String>>) -> Self {
        let image_url = item
            .product_image
            .clone()
            .or_else(|| live_images.get(&item.product_id).cloned().flatten());
        let subtotal = item.subtotal();
        if subtotal.is_none() {
            warn!(
                order_id = %item.order_id,
                item_id = %item.id,
                "Subtotal of {} x {} overflows; reporting it as unknown.",
                item.price_at_purchase,
                item.quantity
            );
        }
        Self {
            item,
            image_url,
            subtotal,
        }
    }
}

/// An order joined with its items, buyer profile and payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub payable_amount: i64,
    pub items: Vec<OrderItemView>,
    pub buyer: Option<Profile>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderBackend>,
    catalog: Arc<dyn CatalogBackend>,
    realtime: Realtime,
}

impl fmt::Debug for OrderService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderService").field("realtime", &self.realtime).finish_non_exhaustive()
    }
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderBackend>, catalog: Arc<dyn CatalogBackend>, realtime: Realtime) -> Self {
        Self {
            orders,
            catalog,
            realtime,
        }
    }

    // --- Writes ---

    #[instrument(
        name = "order_service::create_order",
        skip(self, lines, shipping),
        fields(buyer_id = %buyer_id, lines = lines.len()),
        err(Display)
    )]
    pub async fn create_order(&self, buyer_id: Uuid, lines: &[CartLine], shipping: ShippingInfo) -> ShopResult<NewOrder> {
        if lines.is_empty() {
            return Err(ShopError::Validation("Cart is empty".to_string()));
        }
        shipping.validate()?;

        let product_ids: Vec<Uuid> = lines
            .iter()
            .map(|line| line.product_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let products = self
            .catalog
            .get_products(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect::<HashMap<_, _>>();

        let code = generate_unique_code(&mut rand::thread_rng());
        let draft = draft_order(buyer_id, lines, shipping, &products, code, Utc::now())?;

        if let Err(source) = self.orders.insert_order(&draft).await {
            error!(order_id = %draft.order.id, error = %source, "Failed to write order and items.");
            return Err(ShopError::OrderCreationFailed { source });
        }

        info!(
            "Order {} created for buyer {}: {} items, total {}, unique code {}.",
            draft.order.id,
            buyer_id,
            draft.items.len(),
            draft.order.total_amount,
            draft.order.payment_unique_code
        );
        self.realtime.publish_order(OrderEvent::created(&draft.order));
        Ok(draft)
    }

    /// Buyer picks how they will pay. Only legal while the order is unpaid.
    #[instrument(
        name = "order_service::select_payment_method",
        skip(self),
        fields(order_id = %order_id, buyer_id = %buyer_id, method_id = %method_id),
        err(Display)
    )]
    pub async fn select_payment_method(&self, order_id: Uuid, buyer_id: Uuid, method_id: Uuid) -> ShopResult<Order> {
        let order = self.load(order_id).await?;
        if order.buyer_id != buyer_id {
            return Err(ShopError::Unauthorized(format!("Order {} belongs to another buyer", order_id)));
        }
        let target = order.state().apply(Transition::SelectPaymentMethod)?;

        let method = self
            .catalog
            .get_payment_method(method_id)
            .await?
            .ok_or_else(|| ShopError::not_found("payment method", method_id))?;
        if !method.is_active {
            return Err(ShopError::Validation(format!("Payment method '{}' is not available", method.name)));
        }

        self
            .write_state(&order, target, Some(method.id), Transition::SelectPaymentMethod.name())
            .await
    }

    #[instrument(name = "order_service::confirm_payment_by_admin", skip(self, actor), fields(order_id = %order_id), err(Display))]
    pub async fn confirm_payment_by_admin(&self, actor: &Actor, order_id: Uuid) -> ShopResult<Order> {
        actor.require_admin("confirm payments")?;
        let order = self.load(order_id).await?;
        let target = order.state().apply(Transition::ConfirmPayment)?;
        self.write_state(&order, target, None, Transition::ConfirmPayment.name()).await
    }

    /// Buyer declares they have paid. Same effect as the admin confirmation.
    #[instrument(
        name = "order_service::confirm_payment_by_buyer",
        skip(self),
        fields(order_id = %order_id, buyer_id = %buyer_id),
        err(Display)
    )]
    pub async fn confirm_payment_by_buyer(&self, order_id: Uuid, buyer_id: Uuid) -> ShopResult<Order> {
        let order = self.load(order_id).await?;
        if order.buyer_id != buyer_id {
            return Err(ShopError::Unauthorized(format!(
                "Only the owner may confirm payment for order {}",
                order_id
            )));
        }
        let target = order.state().apply(Transition::ConfirmPayment)?;
        self.write_state(&order, target, None, Transition::ConfirmPayment.name()).await
    }

    /// Admin status update. The paired payment status is implied when omitted.
    #[instrument(
        name = "order_service::update_order_status",
        skip(self, actor),
        fields(order_id = %order_id, new_order_status = %new_order_status),
        err(Display)
    )]
    pub async fn update_order_status(
        &self,
        actor: &Actor,
        order_id: Uuid,
        new_order_status: OrderStatus,
        new_payment_status: Option<PaymentStatus>,
    ) -> ShopResult<Order> {
        actor.require_admin("update order status")?;
        let order = self.load(order_id).await?;
        let target = order.state().resolve_update(new_order_status, new_payment_status)?;
        self.write_state(&order, target, None, "update order status").await
    }

    /// Buyer-initiated cancellation, allowed until the payment is confirmed.
    #[instrument(
        name = "order_service::cancel_order_by_buyer",
        skip(self),
        fields(order_id = %order_id, buyer_id = %buyer_id),
        err(Display)
    )]
    pub async fn cancel_order_by_buyer(&self, order_id: Uuid, buyer_id: Uuid) -> ShopResult<Order> {
        let order = self.load(order_id).await?;
        if order.buyer_id != buyer_id {
            return Err(ShopError::Unauthorized(format!("Order {} belongs to another buyer", order_id)));
        }
        if order.order_status != OrderStatus::Pending {
            return Err(ShopError::invalid_state(Transition::Cancel.name(), order.state()));
        }
        let target = order.state().apply(Transition::Cancel)?;
        self.write_state(&order, target, None, Transition::Cancel.name()).await
    }

    /// Admin cascade delete: items first, then the order.
    #[instrument(name = "order_service::delete_order", skip(self, actor), fields(order_id = %order_id), err(Display))]
    pub async fn delete_order(&self, actor: &Actor, order_id: Uuid) -> ShopResult<()> {
        actor.require_admin("delete orders")?;
        if !self.orders.delete_order(order_id).await? {
            return Err(ShopError::not_found("order", order_id));
        }
        info!("Order {} deleted with its items.", order_id);
        Ok(())
    }

    // --- Reads ---

    #[instrument(name = "order_service::get_order", skip(self, viewer), fields(order_id = %order_id), err(Display))]
    pub async fn get_order(&self, viewer: &Actor, order_id: Uuid) -> ShopResult<OrderDetail> {
        let order = self.load(order_id).await?;
        if !viewer.can_access(order.buyer_id) {
            return Err(ShopError::Unauthorized(format!("Order {} belongs to another buyer", order_id)));
        }
        let mut details = self.project(vec![order]).await?;
        details.pop().ok_or_else(|| ShopError::not_found("order", order_id))
    }

    #[instrument(name = "order_service::list_orders_for_user", skip(self), fields(user_id = %user_id))]
    pub async fn list_orders_for_user(&self, user_id: Uuid) -> ShopResult<Vec<OrderDetail>> {
        let filter = OrderFilter::for_buyer(user_id);
        degrade_read(self.list_projected(&filter).await, "orders for user")
    }

    #[instrument(name = "order_service::list_all_orders", skip(self, actor))]
    pub async fn list_all_orders(&self, actor: &Actor, filter: &OrderFilter) -> ShopResult<Vec<OrderDetail>> {
        actor.require_admin("list all orders")?;
        degrade_read(self.list_projected(filter).await, "all orders")
    }

    // --- Internals ---

    async fn load(&self, order_id: Uuid) -> ShopResult<Order> {
        self
            .orders
            .get_order(order_id)
            .await?
            .ok_or_else(|| ShopError::not_found("order", order_id))
    }

    /// Compare-and-set write of both status fields, then the domain event.
    async fn write_state(
        &self,
        order: &Order,
        target: OrderState,
        payment_method_id: Option<Uuid>,
        operation: &str,
    ) -> ShopResult<Order> {
        let previous = order.state();
        let update = StateUpdate {
            new_state: target,
            payment_method_id,
            at: Utc::now(),
        };
        let updated = match self.orders.update_order_state(order.id, previous, update).await? {
            Some(updated) => updated,
            None => {
                // Lost a race: someone else moved the order since we read it.
                let current = self.load(order.id).await?;
                warn!(order_id = %order.id, expected = %previous, actual = %current.state(), "Order changed concurrently.");
                return Err(ShopError::invalid_state(operation, current.state()));
            }
        };

        info!("Order {} moved {} -> {} ({}).", updated.id, previous, target, operation);
        self.realtime.publish_order(OrderEvent::status_changed(previous, &updated));
        Ok(updated)
    }

    async fn list_projected(&self, filter: &OrderFilter) -> ShopResult<Vec<OrderDetail>> {
        let orders = self.orders.list_orders(filter).await?;
        self.project(orders).await
    }

    async fn project(&self, orders: Vec<Order>) -> ShopResult<Vec<OrderDetail>> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let items = self.orders.list_items(&order_ids).await?;

        // Live product images only matter for items without a snapshot.
        let fallback_ids: Vec<Uuid> = items
            .iter()
            .filter(|item| item.product_image.is_none())
            .map(|item| item.product_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let live_images: HashMap<Uuid, Option<String>> = if fallback_ids.is_empty() {
            HashMap::new()
        } else {
            self
                .catalog
                .get_products(&fallback_ids)
                .await?
                .into_iter()
                .map(|p| (p.id, p.image_url))
                .collect()
        };

        let buyer_ids: Vec<Uuid> = orders.iter().map(|o| o.buyer_id).collect::<HashSet<_>>().into_iter().collect();
        let profiles: HashMap<Uuid, Profile> = self
            .catalog
            .get_profiles(&buyer_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let methods: HashMap<Uuid, PaymentMethod> = if orders.iter().any(|o| o.payment_method_id.is_some()) {
            self
                .catalog
                .list_payment_methods(false)
                .await?
                .into_iter()
                .map(|m| (m.id, m))
                .collect()
        } else {
            HashMap::new()
        };

        let mut items_by_order: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
        for item in items {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(OrderItemView::new(item, &live_images));
        }

        Ok(
            orders
                .into_iter()
                .map(|order| OrderDetail {
                    payable_amount: order.payable_amount(),
                    items: items_by_order.remove(&order.id).unwrap_or_default(),
                    buyer: profiles.get(&order.buyer_id).cloned(),
                    payment_method: order.payment_method_id.and_then(|id| methods.get(&id).cloned()),
                    order,
                })
                .collect(),
        )
    }
}
