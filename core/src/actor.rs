// storefront_core/src/actor.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ShopError, ShopResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Admin,
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn buyer(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Buyer,
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self, action: &str) -> ShopResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ShopError::Unauthorized(format!("Only the admin may {}", action)))
        }
    }

    /// Owners and the admin may read or act on a resource owned by `owner_id`.
    pub fn can_access(&self, owner_id: Uuid) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}

/// Settings injected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopSettings {
    /// The single admin account.
    pub admin_user_id: Uuid,
    /// Buffer size of each realtime hub.
    pub realtime_capacity: usize,
}

impl ShopSettings {
    pub const DEFAULT_REALTIME_CAPACITY: usize = 256;

    pub fn new(admin_user_id: Uuid) -> Self {
        Self {
            admin_user_id,
            realtime_capacity: Self::DEFAULT_REALTIME_CAPACITY,
        }
    }

    /// Resolves a user id into an actor by comparing with the configured admin.
    pub fn actor_for(&self, user_id: Uuid) -> Actor {
        if user_id == self.admin_user_id {
            Actor::admin(user_id)
        } else {
            Actor::buyer(user_id)
        }
    }
}
