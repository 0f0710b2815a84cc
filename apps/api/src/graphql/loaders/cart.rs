//! Cart loaders
//!
//! Carts, their delivery modes and their vouchers are separate backend
//! resources keyed by the same owner/cart pair.

use std::sync::Arc;

use commerce_bridge_dataloader::Loader;
use commerce_bridge_occ_client::{Cart, DeliveryModeList, VoucherList};
use tracing::{debug, instrument};

use super::{fetch_each, BackendSession};
use crate::error::{ApiError, ApiResult};

/// Cart id the backend resolves to the signed-in customer's active cart
pub const CURRENT_CART: &str = "current";

/// Identifies a cart by owner and cart id (code or guid)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartKey {
    pub user_id: String,
    pub cart_id: String,
}

impl CartKey {
    pub fn new(user_id: impl Into<String>, cart_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            cart_id: cart_id.into(),
        }
    }
}

/// Loads full carts
#[derive(Debug, Clone)]
pub struct CartLoader {
    session: BackendSession,
}

impl CartLoader {
    pub fn new(session: BackendSession) -> Self {
        Self { session }
    }
}

impl Loader<CartKey> for CartLoader {
    type Value = Arc<Cart>;
    type Error = ApiError;

    #[instrument(skip(self), fields(batch = keys.len()))]
    async fn load(&self, keys: &[CartKey]) -> ApiResult<Vec<ApiResult<Arc<Cart>>>> {
        debug!("Fetching carts");
        let token = self.session.token();
        fetch_each(keys, |key| {
            self.session
                .client()
                .get_cart(&key.user_id, &key.cart_id, token)
        })
        .await
    }
}

/// Loads the delivery modes available to a cart
#[derive(Debug, Clone)]
pub struct DeliveryModesLoader {
    session: BackendSession,
}

impl DeliveryModesLoader {
    pub fn new(session: BackendSession) -> Self {
        Self { session }
    }
}

impl Loader<CartKey> for DeliveryModesLoader {
    type Value = Arc<DeliveryModeList>;
    type Error = ApiError;

    #[instrument(skip(self), fields(batch = keys.len()))]
    async fn load(&self, keys: &[CartKey]) -> ApiResult<Vec<ApiResult<Arc<DeliveryModeList>>>> {
        debug!("Fetching delivery modes");
        let token = self.session.token();
        fetch_each(keys, |key| {
            self.session
                .client()
                .get_delivery_modes(&key.user_id, &key.cart_id, token)
        })
        .await
    }
}

/// Loads the vouchers applied to a cart
#[derive(Debug, Clone)]
pub struct VouchersLoader {
    session: BackendSession,
}

impl VouchersLoader {
    pub fn new(session: BackendSession) -> Self {
        Self { session }
    }
}

impl Loader<CartKey> for VouchersLoader {
    type Value = Arc<VoucherList>;
    type Error = ApiError;

    #[instrument(skip(self), fields(batch = keys.len()))]
    async fn load(&self, keys: &[CartKey]) -> ApiResult<Vec<ApiResult<Arc<VoucherList>>>> {
        debug!("Fetching vouchers");
        let token = self.session.token();
        fetch_each(keys, |key| {
            self.session
                .client()
                .get_vouchers(&key.user_id, &key.cart_id, token)
        })
        .await
    }
}
