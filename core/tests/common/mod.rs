// tests/common/mod.rs
#![allow(dead_code)]

use chrono::Utc;
use once_cell::sync::Lazy;
use std::sync::Arc;
use storefront_core::{
    Actor, Backends, CartLine, MemoryBackend, NewOrder, OrderEvent, PaymentDetails, PaymentMethod, PaymentMethodInput,
    Product, Profile, ShippingInfo, Shop, ShopSettings, Subscription,
};
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
});

pub fn setup_tracing() {
    Lazy::force(&TRACING_INIT);
}

/// A shop over a fresh memory backend with one admin and one buyer.
pub struct TestShop {
    pub backend: Arc<MemoryBackend>,
    pub shop: Shop,
    pub admin: Actor,
    pub buyer: Actor,
}

impl TestShop {
    pub fn new() -> Self {
        Self::with_realtime_capacity(ShopSettings::DEFAULT_REALTIME_CAPACITY)
    }

    pub fn with_realtime_capacity(capacity: usize) -> Self {
        setup_tracing();
        let backend = Arc::new(MemoryBackend::new());
        let admin_id = Uuid::new_v4();
        let buyer_id = Uuid::new_v4();
        backend.seed_profile(Profile {
            id: buyer_id,
            full_name: "Sari Buyer".to_string(),
            email: Some("sari@example.com".to_string()),
            phone: Some("0812000111".to_string()),
        });
        let settings = ShopSettings {
            realtime_capacity: capacity,
            ..ShopSettings::new(admin_id)
        };
        let shop = Shop::new(Backends::from_shared(backend.clone()), settings);
        Self {
            backend,
            shop,
            admin: settings.actor_for(admin_id),
            buyer: settings.actor_for(buyer_id),
        }
    }

    pub fn seed_product(&self, name: &str, price: i64, image_url: Option<&str>) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            price,
            image_url: image_url.map(str::to_string),
            stock_quantity: 10,
            created_at: now,
            updated_at: now,
        };
        self.backend.seed_product(product.clone());
        product
    }

    pub async fn seed_payment_method(&self, name: &str, is_active: bool) -> PaymentMethod {
        let input = PaymentMethodInput {
            name: name.to_string(),
            details: PaymentDetails::BankTransfer {
                bank_name: "BCA".to_string(),
                account_name: "Toko Kita".to_string(),
                account_number: "1234567890".to_string(),
            },
            is_active,
            display_order: 0,
        };
        self.shop.catalog.create_payment_method(&self.admin, input).await.unwrap()
    }

    /// Places a one-line order for the default buyer.
    pub async fn place_order(&self, product: &Product, quantity: i32) -> NewOrder {
        let lines = [CartLine {
            product_id: product.id,
            quantity,
        }];
        self
            .shop
            .orders
            .create_order(self.buyer.user_id, &lines, shipping())
            .await
            .unwrap()
    }

    /// Feeds every order event published so far through the dispatcher.
    pub async fn dispatch_pending(&self, events: &mut Subscription<OrderEvent>) {
        while let Some(event) = events.try_recv() {
            self.shop.dispatcher.handle_order_event(&event).await;
        }
    }
}

pub fn shipping() -> ShippingInfo {
    ShippingInfo {
        recipient_name: "Sari".to_string(),
        address: "Jl. Merdeka 1".to_string(),
        sub_district: "Gambir".to_string(),
        district: "Jakarta Pusat".to_string(),
        phone: "0812000111".to_string(),
    }
}
