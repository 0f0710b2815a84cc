//! Catalog loaders: categories, products and product searches

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use commerce_bridge_dataloader::{JsonKey, Loader};
use commerce_bridge_occ_client::{Category, Product, ProductSearchPage, SearchQuery};

use super::{fetch_each, BackendSession};
use crate::error::{ApiError, ApiResult};

/// Parameters of one product search
///
/// Used as a loader key through [`JsonKey`], so two searches built from the
/// same arguments share one backend call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchCriteria {
    pub search: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub page_size: u32,
    /// 1-based, as exposed by the GraphQL API
    pub current_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl SearchCriteria {
    pub fn text(search: impl Into<String>, page_size: u32, current_page: u32) -> Self {
        Self {
            search: search.into(),
            category_id: None,
            page_size,
            current_page,
            sort: None,
        }
    }

    pub fn in_category(category_id: impl Into<String>, page_size: u32, current_page: u32) -> Self {
        Self {
            search: String::new(),
            category_id: Some(category_id.into()),
            page_size,
            current_page,
            sort: None,
        }
    }

    pub fn into_key(self) -> ApiResult<JsonKey<Self>> {
        JsonKey::new(self).map_err(|e| ApiError::Internal(format!("unusable search key: {}", e)))
    }

    /// Translate into the backend's `text:sort:facet:value` query
    pub fn to_query(&self) -> SearchQuery {
        let query = match &self.category_id {
            Some(category) => format!(
                "{}:{}:allCategories:{}",
                self.search,
                self.sort.as_deref().unwrap_or("relevance"),
                category
            ),
            None => self.search.clone(),
        };

        SearchQuery {
            query,
            current_page: self.current_page.saturating_sub(1),
            page_size: self.page_size,
            sort: self.sort.clone(),
        }
    }
}

/// Loads categories (with their embedded subtree) by id
#[derive(Debug, Clone)]
pub struct CategoryLoader {
    session: BackendSession,
}

impl CategoryLoader {
    pub fn new(session: BackendSession) -> Self {
        Self { session }
    }
}

impl Loader<String> for CategoryLoader {
    type Value = Arc<Category>;
    type Error = ApiError;

    #[instrument(skip(self), fields(batch = keys.len()))]
    async fn load(&self, keys: &[String]) -> ApiResult<Vec<ApiResult<Arc<Category>>>> {
        debug!("Fetching categories");
        fetch_each(keys, |id| self.session.client().get_category(id)).await
    }
}

/// Loads products by code
#[derive(Debug, Clone)]
pub struct ProductLoader {
    session: BackendSession,
}

impl ProductLoader {
    pub fn new(session: BackendSession) -> Self {
        Self { session }
    }
}

impl Loader<String> for ProductLoader {
    type Value = Arc<Product>;
    type Error = ApiError;

    #[instrument(skip(self), fields(batch = keys.len()))]
    async fn load(&self, keys: &[String]) -> ApiResult<Vec<ApiResult<Arc<Product>>>> {
        debug!("Fetching products");
        fetch_each(keys, |code| self.session.client().get_product(code)).await
    }
}

/// Runs product searches
#[derive(Debug, Clone)]
pub struct ProductSearchLoader {
    session: BackendSession,
}

impl ProductSearchLoader {
    pub fn new(session: BackendSession) -> Self {
        Self { session }
    }
}

impl Loader<JsonKey<SearchCriteria>> for ProductSearchLoader {
    type Value = Arc<ProductSearchPage>;
    type Error = ApiError;

    #[instrument(skip(self), fields(batch = keys.len()))]
    async fn load(
        &self,
        keys: &[JsonKey<SearchCriteria>],
    ) -> ApiResult<Vec<ApiResult<Arc<ProductSearchPage>>>> {
        debug!("Running product searches");
        let queries: Vec<SearchQuery> = keys.iter().map(|key| key.to_query()).collect();
        fetch_each(&queries, |query| self.session.client().search_products(query)).await
    }
}
