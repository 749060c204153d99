// storefront_core/src/shop.rs

use crate::actor::ShopSettings;
use crate::backend::Backends;
use crate::realtime::Realtime;
use crate::services::{CatalogService, ChatService, NotificationDispatcher, NotificationInbox, OrderService};

/// Every service wired against one set of backends and one set of hubs.
#[derive(Debug, Clone)]
pub struct Shop {
    pub settings: ShopSettings,
    pub realtime: Realtime,
    pub orders: OrderService,
    pub catalog: CatalogService,
    pub chat: ChatService,
    pub inbox: NotificationInbox,
    pub dispatcher: NotificationDispatcher,
}

impl Shop {
    pub fn new(backends: Backends, settings: ShopSettings) -> Self {
        let realtime = Realtime::new(settings.realtime_capacity);
        Self {
            orders: OrderService::new(backends.orders.clone(), backends.catalog.clone(), realtime.clone()),
            catalog: CatalogService::new(backends.catalog.clone()),
            chat: ChatService::new(backends.chat.clone(), realtime.clone(), settings.admin_user_id),
            inbox: NotificationInbox::new(backends.notifications.clone()),
            dispatcher: NotificationDispatcher::new(backends.notifications, realtime.clone(), settings.admin_user_id),
            realtime,
            settings,
        }
    }
}
