//! Request-scoped loaders for GraphQL resolvers
//!
//! Every GraphQL request gets one [`RequestLoaders`] bundle holding exactly
//! one [`BatchLoader`] per backend resource. Entities clone the bundle (the
//! loaders are `Arc` handles) so that the whole entity tree of a request
//! shares a single cache per resource.
//!
//! The backend has no multi-key endpoints, so each loader answers a batch by
//! issuing the per-key requests concurrently and reporting failures per slot.

mod cart;
mod catalog;
mod customer;

pub use cart::{CartKey, CartLoader, DeliveryModesLoader, VouchersLoader, CURRENT_CART};
pub use catalog::{CategoryLoader, ProductLoader, ProductSearchLoader, SearchCriteria};
pub use customer::{CurrentUser, CustomerLoader, HistoryPage, OrderHistoryLoader, OrderLoader};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future;

use commerce_bridge_dataloader::{BatchLoader, JsonKey, Loader};
use commerce_bridge_occ_client::{OccClient, OccResult, ANONYMOUS_USER, CURRENT_USER};
use commerce_bridge_shared_config::LoaderConfig;

use crate::error::{ApiError, ApiResult};

/// Backend client plus the caller's credentials
#[derive(Clone)]
pub struct BackendSession {
    client: OccClient,
    token: Option<Arc<str>>,
}

impl fmt::Debug for BackendSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSession")
            .field("client", &self.client)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl BackendSession {
    pub fn new(client: OccClient, token: Option<&str>) -> Self {
        Self {
            client,
            token: token.map(Arc::from),
        }
    }

    pub fn client(&self) -> &OccClient {
        &self.client
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Backend user id owning carts created or read in this session
    pub fn user_id(&self) -> &'static str {
        if self.is_authenticated() {
            CURRENT_USER
        } else {
            ANONYMOUS_USER
        }
    }

    /// Fail with `Unauthorized` unless a bearer token is present
    pub fn require_token(&self) -> ApiResult<&str> {
        self.token().ok_or(ApiError::Unauthorized)
    }
}

/// One loader per backend resource, shared by every entity of a request
#[derive(Clone)]
pub struct RequestLoaders {
    session: BackendSession,
    pub cart: BatchLoader<CartKey, CartLoader>,
    pub delivery_modes: BatchLoader<CartKey, DeliveryModesLoader>,
    pub vouchers: BatchLoader<CartKey, VouchersLoader>,
    pub customer: BatchLoader<CurrentUser, CustomerLoader>,
    pub category: BatchLoader<String, CategoryLoader>,
    pub product: BatchLoader<String, ProductLoader>,
    pub product_search: BatchLoader<JsonKey<SearchCriteria>, ProductSearchLoader>,
    pub order: BatchLoader<String, OrderLoader>,
    pub order_history: BatchLoader<HistoryPage, OrderHistoryLoader>,
}

impl RequestLoaders {
    /// Build fresh loaders (and empty caches) for one request
    pub fn new(session: BackendSession, config: &LoaderConfig) -> Self {
        fn tuned<K, L>(loader: L, config: &LoaderConfig) -> BatchLoader<K, L>
        where
            K: std::hash::Hash + Eq + Send + Sync + Clone + 'static,
            L: Loader<K>,
        {
            BatchLoader::new(loader)
                .with_delay(config.batch_delay())
                .with_max_batch_size(config.max_batch_size)
        }

        Self {
            cart: tuned(CartLoader::new(session.clone()), config),
            delivery_modes: tuned(DeliveryModesLoader::new(session.clone()), config),
            vouchers: tuned(VouchersLoader::new(session.clone()), config),
            customer: tuned(CustomerLoader::new(session.clone()), config),
            category: tuned(CategoryLoader::new(session.clone()), config),
            product: tuned(ProductLoader::new(session.clone()), config),
            product_search: tuned(ProductSearchLoader::new(session.clone()), config),
            order: tuned(OrderLoader::new(session.clone()), config),
            order_history: tuned(OrderHistoryLoader::new(session.clone()), config),
            session,
        }
    }

    pub fn session(&self) -> &BackendSession {
        &self.session
    }

    /// Key of the signed-in customer's active cart
    pub fn customer_cart_key(&self) -> ApiResult<CartKey> {
        self.session.require_token()?;
        Ok(CartKey::new(CURRENT_USER, CURRENT_CART))
    }

    /// Key of a cart owned by the caller
    pub fn cart_key(&self, cart_id: impl Into<String>) -> CartKey {
        CartKey::new(self.session.user_id(), cart_id)
    }

    /// Forget everything cached about a cart after it was modified
    pub fn invalidate_cart(&self, key: &CartKey) {
        self.cart.clear(key);
        self.delivery_modes.clear(key);
        self.vouchers.clear(key);
    }
}

/// Answer a batch by fetching every key concurrently
///
/// The outer result is always `Ok`: a failing key only fails its own slot.
async fn fetch_each<'a, K, V, F, Fut>(
    keys: &'a [K],
    fetch: F,
) -> ApiResult<Vec<ApiResult<Arc<V>>>>
where
    F: Fn(&'a K) -> Fut,
    Fut: Future<Output = OccResult<V>>,
{
    let results = future::join_all(keys.iter().map(fetch)).await;
    Ok(results
        .into_iter()
        .map(|result| result.map(Arc::new).map_err(ApiError::from))
        .collect())
}
