// storefront_app/src/state.rs

use crate::config::AppConfig;
use std::sync::Arc;
use storefront_core::{Actor, Shop};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct AppState {
  pub shop: Shop,
  pub config: Arc<AppConfig>,
}

impl AppState {
  pub fn new(shop: Shop, config: Arc<AppConfig>) -> Self {
    Self { shop, config }
  }

  pub fn actor_for(&self, user_id: Uuid) -> Actor {
    self.shop.settings.actor_for(user_id)
  }
}
