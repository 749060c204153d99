// tests/common/mod.rs
#![allow(dead_code)]

use chrono::Utc;
use once_cell::sync::Lazy;
use std::sync::Arc;
use storefront_app::config::{AppConfig, StorageBackend};
use storefront_app::state::AppState;
use storefront_core::{Backends, MemoryBackend, Product, Shop, ShopSettings};
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

pub struct TestApp {
  pub backend: Arc<MemoryBackend>,
  pub state: AppState,
  pub admin_id: Uuid,
  pub buyer_id: Uuid,
}

impl TestApp {
  pub fn new() -> Self {
    setup_tracing();
    let admin_id = Uuid::new_v4();
    let config = AppConfig {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      storage_backend: StorageBackend::Memory,
      database_url: None,
      run_migrations: false,
      admin_user_id: admin_id,
      realtime_capacity: ShopSettings::DEFAULT_REALTIME_CAPACITY,
    };
    let backend = Arc::new(MemoryBackend::new());
    let shop = Shop::new(Backends::from_shared(backend.clone()), config.shop_settings());
    Self {
      backend,
      state: AppState::new(shop, Arc::new(config)),
      admin_id,
      buyer_id: Uuid::new_v4(),
    }
  }

  pub fn seed_product(&self, name: &str, price: i64) -> Product {
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      name: name.to_string(),
      description: Some(format!("A fine {}", name)),
      price,
      image_url: None,
      stock_quantity: 5,
      created_at: now,
      updated_at: now,
    };
    self.backend.seed_product(product.clone());
    product
  }
}

pub fn shipping_json() -> serde_json::Value {
  serde_json::json!({
    "recipient_name": "Sari",
    "address": "Jl. Merdeka 1",
    "sub_district": "Gambir",
    "district": "Jakarta Pusat",
    "phone": "0812000111"
  })
}
