//! Customer and order loaders
//!
//! All of these read resources of the token's owner, so they fail with
//! `Unauthorized` for anonymous sessions.

use std::sync::Arc;

use commerce_bridge_dataloader::Loader;
use commerce_bridge_occ_client::{Order, OrderHistoryList, User};
use tracing::{debug, instrument};

use super::{fetch_each, BackendSession};
use crate::error::{ApiError, ApiResult};

/// Key of the single customer a session can see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrentUser;

/// One page of order history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryPage {
    pub current_page: u32,
    pub page_size: u32,
}

/// Loads the profile of the token's owner
#[derive(Debug, Clone)]
pub struct CustomerLoader {
    session: BackendSession,
}

impl CustomerLoader {
    pub fn new(session: BackendSession) -> Self {
        Self { session }
    }
}

impl Loader<CurrentUser> for CustomerLoader {
    type Value = Arc<User>;
    type Error = ApiError;

    #[instrument(skip(self, keys))]
    async fn load(&self, keys: &[CurrentUser]) -> ApiResult<Vec<ApiResult<Arc<User>>>> {
        let token = self.session.require_token()?;
        debug!("Fetching current customer");
        fetch_each(keys, |_| self.session.client().get_current_user(Some(token))).await
    }
}

/// Loads full orders by code
#[derive(Debug, Clone)]
pub struct OrderLoader {
    session: BackendSession,
}

impl OrderLoader {
    pub fn new(session: BackendSession) -> Self {
        Self { session }
    }
}

impl Loader<String> for OrderLoader {
    type Value = Arc<Order>;
    type Error = ApiError;

    #[instrument(skip(self), fields(batch = keys.len()))]
    async fn load(&self, keys: &[String]) -> ApiResult<Vec<ApiResult<Arc<Order>>>> {
        let token = self.session.require_token()?;
        debug!("Fetching orders");
        fetch_each(keys, |code| self.session.client().get_order(code, Some(token))).await
    }
}

/// Loads pages of the customer's order history
#[derive(Debug, Clone)]
pub struct OrderHistoryLoader {
    session: BackendSession,
}

impl OrderHistoryLoader {
    pub fn new(session: BackendSession) -> Self {
        Self { session }
    }
}

impl Loader<HistoryPage> for OrderHistoryLoader {
    type Value = Arc<OrderHistoryList>;
    type Error = ApiError;

    #[instrument(skip(self), fields(batch = keys.len()))]
    async fn load(&self, keys: &[HistoryPage]) -> ApiResult<Vec<ApiResult<Arc<OrderHistoryList>>>> {
        let token = self.session.require_token()?;
        debug!("Fetching order history");
        fetch_each(keys, |page| {
            self.session
                .client()
                .get_order_history(page.current_page, page.page_size, Some(token))
        })
        .await
    }
}
