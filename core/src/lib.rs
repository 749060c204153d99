// storefront_core/src/lib.rs

//! Storefront core: the order lifecycle and payment state machine, the
//! notification dispatcher and the buyer/admin chat thread.
//!
//! Storage sits behind the async traits in [`backend`]. The crate ships an
//! in-memory implementation; the server crate provides a Postgres one.
//! Services publish domain events on the hubs in [`realtime`], which the
//! [`NotificationDispatcher`] turns into notification rows and live toasts.

pub mod actor;
pub mod backend;
pub mod catalog;
pub mod chat;
pub mod error;
pub mod notification;
pub mod order;
pub mod realtime;
pub mod services;
pub mod shop;

// --- Re-exports for the Public API ---

pub use crate::actor::{Actor, Role, ShopSettings};
pub use crate::backend::{
    Backends, CatalogBackend, ChatBackend, MemoryBackend, NotificationBackend, OrderBackend, OrderFilter, StateUpdate,
};
pub use crate::catalog::{PaymentDetails, PaymentMethod, PaymentMethodInput, Product, Profile};
pub use crate::chat::{ChatMessage, ContextRef, ConversationSummary, NewChatMessage, ThreadEntry, ThreadScope};
pub use crate::error::{ShopError, ShopResult};
pub use crate::notification::{LiveToast, NewNotification, Notification, NotificationLevel};
pub use crate::order::{
    CartLine, NewOrder, Order, OrderEvent, OrderEventKind, OrderItem, OrderState, OrderStatus, PaymentStatus,
    ShippingInfo, Transition,
};
pub use crate::realtime::{DispatchEvent, DispatchFeed, Hub, Realtime, Subscription, ToastConnection, ToastHub};
pub use crate::services::dispatcher::Delivery;
pub use crate::services::{
    CatalogService, ChatService, NotificationDispatcher, NotificationInbox, OrderDetail, OrderItemView, OrderService,
};
pub use crate::shop::Shop;
