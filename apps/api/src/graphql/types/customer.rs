//! Customer and order GraphQL types
//!
//! Every type here reads resources of the token's owner.

use std::sync::Arc;

use async_graphql::{Object, Result, ResultExt, SimpleObject};
use chrono::{DateTime, Utc};

use commerce_bridge_dataloader::{Entity, LazyEntity};
use commerce_bridge_occ_client::{
    Order as OccOrder, OrderHistory, OrderHistoryList, User as OccUser,
};

use crate::error::{ApiError, ApiResult};
use crate::graphql::loaders::{CurrentUser, HistoryPage, RequestLoaders};
use crate::graphql::pagination::{clamp_current_page, clamp_page_size, DEFAULT_PAGE_SIZE};

use super::shared::{Address, Money, SearchResultPageInfo};

/// Backend timestamps look like `2024-03-01T10:15:00+0000`
const BACKEND_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Render a backend timestamp as `YYYY-MM-DD HH:MM:SS` in UTC
fn format_order_date(raw: &str) -> String {
    DateTime::parse_from_str(raw, BACKEND_DATE_FORMAT)
        .map(|date| {
            date.with_timezone(&Utc)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}

// ========== Customer ==========

pub struct CustomerSource {
    loaders: RequestLoaders,
}

impl Entity for CustomerSource {
    type Raw = Arc<OccUser>;
    type Output = Arc<OccUser>;
    type Error = ApiError;

    async fn load(&self) -> ApiResult<Arc<OccUser>> {
        Ok(self.loaders.customer.load(CurrentUser).await?)
    }

    fn convert(&self, raw: Arc<OccUser>) -> ApiResult<Arc<OccUser>> {
        Ok(raw)
    }
}

/// The signed-in customer
pub struct Customer {
    entity: LazyEntity<CustomerSource>,
}

impl Customer {
    pub fn new(loaders: RequestLoaders) -> Self {
        Self {
            entity: LazyEntity::new(CustomerSource { loaders }),
        }
    }
}

#[Object(rename_fields = "snake_case")]
impl Customer {
    async fn firstname(&self) -> Result<Option<String>> {
        self.entity
            .get(|user| user.first_name.clone())
            .await
            .extend()
    }

    async fn lastname(&self) -> Result<Option<String>> {
        self.entity
            .get(|user| user.last_name.clone())
            .await
            .extend()
    }

    /// Registered customers sign in with their email as uid
    async fn email(&self) -> Result<Option<String>> {
        self.entity
            .get(|user| user.uid.contains('@').then(|| user.uid.clone()))
            .await
            .extend()
    }

    async fn default_shipping_address(&self) -> Result<Option<Address>> {
        self.entity
            .get(|user| user.default_address.as_ref().map(Address::from))
            .await
            .extend()
    }

    /// Placed orders, newest first
    async fn orders(
        &self,
        #[graphql(default_with = "DEFAULT_PAGE_SIZE")] page_size: i32,
        #[graphql(default = 1)] current_page: i32,
    ) -> CustomerOrders {
        let page = HistoryPage {
            current_page: clamp_current_page(current_page) - 1,
            page_size: clamp_page_size(page_size),
        };
        CustomerOrders::new(page, self.entity.source().loaders.clone())
    }
}

// ========== Order history ==========

pub struct OrderHistorySource {
    page: HistoryPage,
    loaders: RequestLoaders,
}

impl Entity for OrderHistorySource {
    type Raw = Arc<OrderHistoryList>;
    type Output = Arc<OrderHistoryList>;
    type Error = ApiError;

    async fn load(&self) -> ApiResult<Arc<OrderHistoryList>> {
        Ok(self.loaders.order_history.load(self.page).await?)
    }

    fn convert(&self, raw: Arc<OrderHistoryList>) -> ApiResult<Arc<OrderHistoryList>> {
        Ok(raw)
    }
}

/// One page of the customer's orders
pub struct CustomerOrders {
    entity: LazyEntity<OrderHistorySource>,
}

impl CustomerOrders {
    pub fn new(page: HistoryPage, loaders: RequestLoaders) -> Self {
        Self {
            entity: LazyEntity::new(OrderHistorySource { page, loaders }),
        }
    }
}

#[Object(rename_fields = "snake_case")]
impl CustomerOrders {
    async fn items(&self) -> Result<Vec<CustomerOrder>> {
        let history = self.entity.resolve().await.extend()?;
        let loaders = &self.entity.source().loaders;

        Ok(history
            .orders
            .iter()
            .map(|summary| CustomerOrder::new(summary.clone(), loaders.clone()))
            .collect())
    }

    async fn total_count(&self) -> Result<Option<i64>> {
        self.entity
            .get(|history| history.pagination.as_ref().and_then(|p| p.total_results))
            .await
            .extend()
    }

    async fn page_info(&self) -> Result<Option<SearchResultPageInfo>> {
        self.entity
            .get(|history| history.pagination.as_ref().map(SearchResultPageInfo::from))
            .await
            .extend()
    }
}

// ========== Order ==========

#[derive(Debug, Clone, SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct OrderTotal {
    pub grand_total: Option<Money>,
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct OrderItem {
    pub product_sku: String,
    pub product_name: Option<String>,
    pub quantity_ordered: f64,
    pub product_sale_price: Option<Money>,
}

pub struct OrderSource {
    code: String,
    loaders: RequestLoaders,
}

impl Entity for OrderSource {
    type Raw = Arc<OccOrder>;
    type Output = Vec<OrderItem>;
    type Error = ApiError;

    async fn load(&self) -> ApiResult<Arc<OccOrder>> {
        Ok(self.loaders.order.load(self.code.clone()).await?)
    }

    fn convert(&self, raw: Arc<OccOrder>) -> ApiResult<Vec<OrderItem>> {
        raw.entries
            .iter()
            .map(|entry| -> ApiResult<OrderItem> {
                let product = entry.product.as_ref().ok_or_else(|| {
                    ApiError::InvalidPayload(format!(
                        "order {} has an entry without product",
                        raw.code
                    ))
                })?;
                Ok(OrderItem {
                    product_sku: product.code.clone(),
                    product_name: product.name.clone(),
                    quantity_ordered: entry.quantity.unwrap_or(0) as f64,
                    product_sale_price: entry.base_price.as_ref().map(Money::from),
                })
            })
            .collect()
    }
}

/// An order as listed in the history
///
/// The summary answers most fields; `items` loads the full order.
pub struct CustomerOrder {
    summary: OrderHistory,
    entity: LazyEntity<OrderSource>,
}

impl CustomerOrder {
    pub fn new(summary: OrderHistory, loaders: RequestLoaders) -> Self {
        let entity = LazyEntity::new(OrderSource {
            code: summary.code.clone(),
            loaders,
        });
        Self { summary, entity }
    }
}

#[Object(rename_fields = "snake_case")]
impl CustomerOrder {
    /// Order number
    async fn number(&self) -> &str {
        &self.summary.code
    }

    async fn status(&self) -> Option<&str> {
        self.summary
            .status_display
            .as_deref()
            .or(self.summary.status.as_deref())
    }

    async fn order_date(&self) -> Option<String> {
        self.summary.placed.as_deref().map(format_order_date)
    }

    async fn total(&self) -> OrderTotal {
        OrderTotal {
            grand_total: self.summary.total.as_ref().map(Money::from),
        }
    }

    async fn items(&self) -> Result<Vec<OrderItem>> {
        self.entity.get(|items| items.clone()).await.extend()
    }
}
