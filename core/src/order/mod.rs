// storefront_core/src/order/mod.rs

pub mod aggregate;
pub mod event;
pub mod status;

pub use aggregate::{
    draft_order, generate_unique_code, CartLine, NewOrder, Order, OrderItem, ShippingInfo, Transition,
    UNIQUE_CODE_MAX, UNIQUE_CODE_MIN,
};
pub use event::{OrderEvent, OrderEventKind};
pub use status::{OrderState, OrderStatus, PaymentStatus};
