// storefront_core/src/realtime.rs

//! Realtime subscription manager: one broadcast hub per aggregate, plus the
//! toast hub that knows which recipients currently hold a live connection.
//!
//! Hubs are lossy. The notification dispatcher reads from a separate
//! unbounded feed so every event reaches the inbox even when it falls behind.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::actor::Actor;
use crate::chat::ChatMessage;
use crate::notification::LiveToast;
use crate::order::OrderEvent;

type Filter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync + 'static>;

/// A typed broadcast channel. Publishing never blocks; slow subscribers skip
/// what they missed.
pub struct Hub<T> {
    name: &'static str,
    sender: broadcast::Sender<T>,
}

impl<T> Clone for Hub<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            sender: self.sender.clone(),
        }
    }
}

impl<T> fmt::Debug for Hub<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("name", &self.name)
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

impl<T: Clone + Send + 'static> Hub<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { name, sender }
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: T) -> usize {
        match self.sender.send(event) {
            Ok(delivered) => delivered,
            Err(_) => {
                debug!(hub = self.name, "Published with no subscribers.");
                0
            }
        }
    }

    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            hub: self.name,
            receiver: self.sender.subscribe(),
            filter: None,
        }
    }

    pub fn subscribe_filtered(&self, filter: impl Fn(&T) -> bool + Send + Sync + 'static) -> Subscription<T> {
        Subscription {
            hub: self.name,
            receiver: self.sender.subscribe(),
            filter: Some(Arc::new(filter)),
        }
    }
}

pub struct Subscription<T> {
    hub: &'static str,
    receiver: broadcast::Receiver<T>,
    filter: Option<Filter<T>>,
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("hub", &self.hub)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

impl<T: Clone> Subscription<T> {
    /// Next event passing the filter. `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.as_ref().map_or(true, |accept| accept(&event)) {
                        return Some(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(hub = self.hub, skipped, "Subscriber lagged; skipping missed events.");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.filter.as_ref().map_or(true, |accept| accept(&event)) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(hub = self.hub, skipped, "Subscriber lagged; skipping missed events.");
                }
                Err(_) => return None,
            }
        }
    }
}

/// Live toast fan-out with per-recipient connection counts.
#[derive(Clone, Debug)]
pub struct ToastHub {
    hub: Hub<LiveToast>,
    connections: Arc<Mutex<HashMap<Uuid, usize>>>,
}

impl ToastHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            hub: Hub::new("toasts", capacity),
            connections: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Opens a live connection for `user_id`. It counts as connected until the
    /// returned handle is dropped.
    pub fn connect(&self, user_id: Uuid) -> ToastConnection {
        *self.connections.lock().entry(user_id).or_insert(0) += 1;
        debug!(%user_id, "Live toast connection opened.");
        ToastConnection {
            user_id,
            subscription: self.hub.subscribe_filtered(move |toast: &LiveToast| toast.user_id == user_id),
            connections: Arc::clone(&self.connections),
        }
    }

    pub fn is_connected(&self, user_id: Uuid) -> bool {
        self.connections.lock().get(&user_id).is_some_and(|count| *count > 0)
    }

    /// Pushes the toast if its recipient is connected. Returns whether it was sent.
    pub fn push(&self, toast: LiveToast) -> bool {
        if !self.is_connected(toast.user_id) {
            return false;
        }
        self.hub.publish(toast) > 0
    }
}

#[derive(Debug)]
pub struct ToastConnection {
    user_id: Uuid,
    subscription: Subscription<LiveToast>,
    connections: Arc<Mutex<HashMap<Uuid, usize>>>,
}

impl ToastConnection {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub async fn recv(&mut self) -> Option<LiveToast> {
        self.subscription.recv().await
    }

    pub fn try_recv(&mut self) -> Option<LiveToast> {
        self.subscription.try_recv()
    }
}

impl Drop for ToastConnection {
    fn drop(&mut self) {
        let mut connections = self.connections.lock();
        if let Some(count) = connections.get_mut(&self.user_id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                connections.remove(&self.user_id);
            }
        }
    }
}

/// Events the notification dispatcher consumes.
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    Order(OrderEvent),
    Chat(ChatMessage),
}

/// Lossless single-consumer feed for the dispatcher.
#[derive(Clone)]
pub struct DispatchFeed {
    sender: mpsc::UnboundedSender<DispatchEvent>,
    receiver: Arc<Mutex<Option<mpsc::UnboundedReceiver<DispatchEvent>>>>,
}

impl fmt::Debug for DispatchFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchFeed")
            .field("claimed", &self.receiver.lock().is_none())
            .finish()
    }
}

impl DispatchFeed {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(Some(receiver))),
        }
    }

    pub fn send(&self, event: DispatchEvent) {
        if self.sender.send(event).is_err() {
            warn!("Dispatch feed is closed; event not queued for notifications.");
        }
    }

    /// Hands out the receiving end. Only the first caller gets it.
    pub fn claim(&self) -> Option<mpsc::UnboundedReceiver<DispatchEvent>> {
        self.receiver.lock().take()
    }
}

impl Default for DispatchFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// One hub per aggregate, shared by services, the dispatcher and HTTP streams.
#[derive(Clone, Debug)]
pub struct Realtime {
    pub orders: Hub<OrderEvent>,
    pub chat: Hub<ChatMessage>,
    pub toasts: ToastHub,
    pub dispatch: DispatchFeed,
}

impl Realtime {
    pub fn new(capacity: usize) -> Self {
        Self {
            orders: Hub::new("orders", capacity),
            chat: Hub::new("chat", capacity),
            toasts: ToastHub::new(capacity),
            dispatch: DispatchFeed::new(),
        }
    }

    /// Queues the event for the dispatcher and fans it out to live subscribers.
    pub fn publish_order(&self, event: OrderEvent) {
        self.dispatch.send(DispatchEvent::Order(event.clone()));
        self.orders.publish(event);
    }

    pub fn publish_chat(&self, message: ChatMessage) {
        self.dispatch.send(DispatchEvent::Chat(message.clone()));
        self.chat.publish(message);
    }

    /// Order events visible to `viewer`: the admin sees all, buyers their own.
    pub fn subscribe_orders(&self, viewer: Actor) -> Subscription<OrderEvent> {
        if viewer.is_admin() {
            self.orders.subscribe()
        } else {
            let buyer_id = viewer.user_id;
            self.orders.subscribe_filtered(move |event: &OrderEvent| event.buyer_id == buyer_id)
        }
    }

    /// Chat messages sent to or by `user_id`.
    pub fn subscribe_chat(&self, user_id: Uuid) -> Subscription<ChatMessage> {
        self
            .chat
            .subscribe_filtered(move |m: &ChatMessage| m.sender_id == user_id || m.receiver_id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationLevel;

    fn toast(user_id: Uuid) -> LiveToast {
        LiveToast {
            notification_id: None,
            user_id,
            title: "t".to_string(),
            message: "m".to_string(),
            link: None,
            level: NotificationLevel::Info,
        }
    }

    #[tokio::test]
    async fn toasts_reach_only_connected_recipients() {
        let hub = ToastHub::new(8);
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(!hub.push(toast(alice)));

        let mut conn = hub.connect(alice);
        assert!(hub.is_connected(alice));
        assert!(!hub.push(toast(bob)));
        assert!(hub.push(toast(alice)));
        assert_eq!(conn.recv().await.map(|t| t.user_id), Some(alice));

        drop(conn);
        assert!(!hub.is_connected(alice));
    }

    #[tokio::test]
    async fn filtered_subscription_skips_other_events() {
        let hub: Hub<u32> = Hub::new("numbers", 8);
        let mut evens = hub.subscribe_filtered(|n| n % 2 == 0);
        for n in 1..=4 {
            hub.publish(n);
        }
        assert_eq!(evens.recv().await, Some(2));
        assert_eq!(evens.recv().await, Some(4));
        assert_eq!(evens.try_recv(), None);
    }

    #[test]
    fn dispatch_feed_keeps_everything_and_has_one_consumer() {
        let realtime = Realtime::new(1);
        let now = chrono::Utc::now();
        let mut feed = realtime.dispatch.claim().unwrap();
        assert!(realtime.dispatch.claim().is_none());

        for _ in 0..5 {
            realtime.publish_chat(ChatMessage {
                id: Uuid::new_v4(),
                sender_id: Uuid::new_v4(),
                receiver_id: Uuid::new_v4(),
                message: "hi".to_string(),
                product_id: None,
                order_id: None,
                is_read: false,
                created_at: now,
                updated_at: now,
            });
        }
        let mut queued = 0;
        while let Ok(DispatchEvent::Chat(_)) = feed.try_recv() {
            queued += 1;
        }
        assert_eq!(queued, 5);
    }
}
