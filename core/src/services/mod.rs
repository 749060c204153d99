// storefront_core/src/services/mod.rs

//! Application services. Each one owns the backend handles it needs plus a
//! clone of the realtime hubs it publishes to.

pub mod catalog;
pub mod chat;
pub mod dispatcher;
pub mod inbox;
pub mod orders;

pub use catalog::CatalogService;
pub use chat::ChatService;
pub use dispatcher::NotificationDispatcher;
pub use inbox::NotificationInbox;
pub use orders::{OrderDetail, OrderItemView, OrderService};

use tracing::error;

use crate::error::{ShopError, ShopResult};

/// List-style reads fall back to an empty value when the backend is down.
/// Every other error still propagates.
pub(crate) fn degrade_read<T: Default>(result: ShopResult<T>, what: &str) -> ShopResult<T> {
    match result {
        Err(ShopError::Upstream { source }) => {
            error!(error = %source, "Backend read of {} failed; returning an empty result.", what);
            Ok(T::default())
        }
        other => other,
    }
}
