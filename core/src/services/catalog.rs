// storefront_core/src/services/catalog.rs

use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::degrade_read;
use crate::actor::Actor;
use crate::backend::CatalogBackend;
use crate::catalog::{PaymentMethod, PaymentMethodInput, Product};
use crate::error::{ShopError, ShopResult};

/// Product reads and the admin-managed payment method catalog.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogBackend>,
}

impl fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogService").finish_non_exhaustive()
    }
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogBackend>) -> Self {
        Self { catalog }
    }

    #[instrument(name = "catalog_service::list_products", skip(self))]
    pub async fn list_products(&self) -> ShopResult<Vec<Product>> {
        let result = self.catalog.list_products().await.map_err(ShopError::from);
        degrade_read(result, "products")
    }

    #[instrument(name = "catalog_service::get_product", skip(self), fields(product_id = %product_id), err(Display))]
    pub async fn get_product(&self, product_id: Uuid) -> ShopResult<Product> {
        self
            .catalog
            .get_products(&[product_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ShopError::not_found("product", product_id))
    }

    /// Methods a buyer may choose from.
    #[instrument(name = "catalog_service::list_active_payment_methods", skip(self))]
    pub async fn list_active_payment_methods(&self) -> ShopResult<Vec<PaymentMethod>> {
        let result = self.catalog.list_payment_methods(true).await.map_err(ShopError::from);
        degrade_read(result, "active payment methods")
    }

    #[instrument(name = "catalog_service::list_all_payment_methods", skip(self, actor))]
    pub async fn list_all_payment_methods(&self, actor: &Actor) -> ShopResult<Vec<PaymentMethod>> {
        actor.require_admin("manage payment methods")?;
        let result = self.catalog.list_payment_methods(false).await.map_err(ShopError::from);
        degrade_read(result, "payment methods")
    }

    #[instrument(name = "catalog_service::create_payment_method", skip(self, actor, input), err(Display))]
    pub async fn create_payment_method(&self, actor: &Actor, input: PaymentMethodInput) -> ShopResult<PaymentMethod> {
        actor.require_admin("manage payment methods")?;
        input.validate()?;
        let now = Utc::now();
        let method = PaymentMethod {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            details: input.details,
            is_active: input.is_active,
            display_order: input.display_order,
            created_at: now,
            updated_at: now,
        };
        self.catalog.insert_payment_method(&method).await?;
        info!("Payment method '{}' ({}) created.", method.name, method.details.type_name());
        Ok(method)
    }

    #[instrument(
        name = "catalog_service::update_payment_method",
        skip(self, actor, input),
        fields(method_id = %method_id),
        err(Display)
    )]
    pub async fn update_payment_method(
        &self,
        actor: &Actor,
        method_id: Uuid,
        input: PaymentMethodInput,
    ) -> ShopResult<PaymentMethod> {
        actor.require_admin("manage payment methods")?;
        input.validate()?;
        let existing = self
            .catalog
            .get_payment_method(method_id)
            .await?
            .ok_or_else(|| ShopError::not_found("payment method", method_id))?;
        let method = PaymentMethod {
            name: input.name.trim().to_string(),
            details: input.details,
            is_active: input.is_active,
            display_order: input.display_order,
            updated_at: Utc::now(),
            ..existing
        };
        if !self.catalog.update_payment_method(&method).await? {
            return Err(ShopError::not_found("payment method", method_id));
        }
        info!("Payment method {} updated (active: {}).", method_id, method.is_active);
        Ok(method)
    }

    /// Toggles availability without touching the rest of the method.
    #[instrument(
        name = "catalog_service::set_payment_method_active",
        skip(self, actor),
        fields(method_id = %method_id),
        err(Display)
    )]
    pub async fn set_payment_method_active(
        &self,
        actor: &Actor,
        method_id: Uuid,
        is_active: bool,
    ) -> ShopResult<PaymentMethod> {
        actor.require_admin("manage payment methods")?;
        let existing = self
            .catalog
            .get_payment_method(method_id)
            .await?
            .ok_or_else(|| ShopError::not_found("payment method", method_id))?;
        let method = PaymentMethod {
            is_active,
            updated_at: Utc::now(),
            ..existing
        };
        if !self.catalog.update_payment_method(&method).await? {
            return Err(ShopError::not_found("payment method", method_id));
        }
        info!("Payment method {} is now {}.", method_id, if is_active { "active" } else { "inactive" });
        Ok(method)
    }
}
