//! Catalog GraphQL types
//!
//! Categories, product lists and products refer to each other, so they live
//! together. Each wraps a [`LazyEntity`] and only touches the backend when a
//! field that needs the payload is selected.

use std::sync::Arc;

use async_graphql::{Enum, Object, Result, ResultExt, SimpleObject};

use commerce_bridge_dataloader::{Entity, JsonKey, LazyEntity};
use commerce_bridge_occ_client::{
    Category as OccCategory, Product as OccProduct, ProductSearchPage,
};

use crate::error::{ApiError, ApiResult};
use crate::graphql::loaders::{RequestLoaders, SearchCriteria};
use crate::graphql::pagination::{clamp_current_page, clamp_page_size, DEFAULT_PAGE_SIZE};

use super::shared::{Money, SearchResultPageInfo};

/// First path segment of a storefront URL
fn url_key(url: &str) -> Option<String> {
    url.split('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

// ========== Category ==========

pub struct CategorySource {
    id: String,
    loaders: RequestLoaders,
}

impl Entity for CategorySource {
    type Raw = Arc<OccCategory>;
    type Output = Arc<OccCategory>;
    type Error = ApiError;

    async fn load(&self) -> ApiResult<Arc<OccCategory>> {
        Ok(self.loaders.category.load(self.id.clone()).await?)
    }

    fn convert(&self, raw: Arc<OccCategory>) -> ApiResult<Arc<OccCategory>> {
        Ok(raw)
    }
}

/// A category and its position in the category tree
pub struct CategoryTree {
    entity: LazyEntity<CategorySource>,
}

impl CategoryTree {
    pub fn new(id: impl Into<String>, loaders: RequestLoaders) -> Self {
        Self {
            entity: LazyEntity::new(CategorySource {
                id: id.into(),
                loaders,
            }),
        }
    }

    fn category_id(&self) -> &str {
        &self.entity.source().id
    }

    fn loaders(&self) -> &RequestLoaders {
        &self.entity.source().loaders
    }
}

#[Object(rename_fields = "snake_case")]
impl CategoryTree {
    /// Category identifier
    async fn id(&self) -> &str {
        self.category_id()
    }

    /// Unique identifier, equal to `id` for this backend
    async fn uid(&self) -> &str {
        self.category_id()
    }

    async fn name(&self) -> Result<Option<String>> {
        self.entity
            .get(|category| category.name.clone())
            .await
            .extend()
    }

    /// Storefront path without leading slash
    async fn url_path(&self) -> Result<Option<String>> {
        self.entity
            .get(|category| {
                category
                    .url
                    .as_deref()
                    .map(|url| url.trim_start_matches('/').to_string())
            })
            .await
            .extend()
    }

    async fn children_count(&self) -> Result<String> {
        self.entity
            .get(|category| category.subcategories.len().to_string())
            .await
            .extend()
    }

    /// Direct subcategories
    ///
    /// The parent payload already embeds them, so they are primed into the
    /// category loader and never fetched again.
    async fn children(&self) -> Result<Vec<CategoryTree>> {
        let category = self.entity.resolve().await.extend()?;
        let loaders = self.loaders();

        Ok(category
            .subcategories
            .iter()
            .map(|child| {
                loaders
                    .category
                    .prime(child.id.clone(), Arc::new(child.clone()));
                CategoryTree::new(child.id.clone(), loaders.clone())
            })
            .collect())
    }

    /// Products assigned to this category
    async fn products(
        &self,
        #[graphql(default_with = "DEFAULT_PAGE_SIZE")] page_size: i32,
        #[graphql(default = 1)] current_page: i32,
    ) -> Result<Products> {
        let criteria = SearchCriteria::in_category(
            self.category_id(),
            clamp_page_size(page_size),
            clamp_current_page(current_page),
        );
        Products::new(criteria, self.loaders().clone()).extend()
    }
}

// ========== Product list ==========

pub struct ProductSearchSource {
    criteria: JsonKey<SearchCriteria>,
    loaders: RequestLoaders,
}

impl Entity for ProductSearchSource {
    type Raw = Arc<ProductSearchPage>;
    type Output = Arc<ProductSearchPage>;
    type Error = ApiError;

    async fn load(&self) -> ApiResult<Arc<ProductSearchPage>> {
        Ok(self
            .loaders
            .product_search
            .load(self.criteria.clone())
            .await?)
    }

    fn convert(&self, raw: Arc<ProductSearchPage>) -> ApiResult<Arc<ProductSearchPage>> {
        Ok(raw)
    }
}

/// One page of products matching search criteria
pub struct Products {
    entity: LazyEntity<ProductSearchSource>,
}

impl Products {
    pub fn new(criteria: SearchCriteria, loaders: RequestLoaders) -> ApiResult<Self> {
        Ok(Self {
            entity: LazyEntity::new(ProductSearchSource {
                criteria: criteria.into_key()?,
                loaders,
            }),
        })
    }
}

#[Object(rename_fields = "snake_case")]
impl Products {
    /// Matching products, served from the search hits where possible
    async fn items(&self) -> Result<Vec<Product>> {
        let page = self.entity.resolve().await.extend()?;
        let loaders = &self.entity.source().loaders;

        Ok(page
            .products
            .iter()
            .map(|product| Product::from_summary(Arc::new(product.clone()), loaders.clone()))
            .collect())
    }

    /// Number of products matching the criteria across all pages
    async fn total_count(&self) -> Result<Option<i64>> {
        self.entity
            .get(|page| page.pagination.as_ref().and_then(|p| p.total_results))
            .await
            .extend()
    }

    async fn page_info(&self) -> Result<Option<SearchResultPageInfo>> {
        self.entity
            .get(|page| page.pagination.as_ref().map(SearchResultPageInfo::from))
            .await
            .extend()
    }
}

// ========== Product ==========

/// Availability of a product
#[derive(Enum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProductStockStatus {
    InStock,
    OutOfStock,
}

impl ProductStockStatus {
    fn from_backend(status: &str) -> Self {
        match status {
            "outOfStock" => Self::OutOfStock,
            _ => Self::InStock,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct ProductPrice {
    pub regular_price: Money,
    pub final_price: Money,
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct PriceRange {
    pub minimum_price: ProductPrice,
}

/// HTML content
#[derive(Debug, Clone, SimpleObject)]
pub struct ComplexTextValue {
    pub html: String,
}

pub struct ProductSource {
    sku: String,
    loaders: RequestLoaders,
}

impl Entity for ProductSource {
    type Raw = Arc<OccProduct>;
    type Output = Arc<OccProduct>;
    type Error = ApiError;

    async fn load(&self) -> ApiResult<Arc<OccProduct>> {
        Ok(self.loaders.product.load(self.sku.clone()).await?)
    }

    fn convert(&self, raw: Arc<OccProduct>) -> ApiResult<Arc<OccProduct>> {
        Ok(raw)
    }
}

/// A catalog product
///
/// Cart entries and search hits embed a product summary that may lack
/// fields of the full product payload. Fields present in the summary are
/// served from it; everything else loads the full product.
pub struct Product {
    summary: Option<Arc<OccProduct>>,
    entity: LazyEntity<ProductSource>,
}

impl Product {
    pub fn new(sku: impl Into<String>, loaders: RequestLoaders) -> Self {
        Self {
            summary: None,
            entity: LazyEntity::new(ProductSource {
                sku: sku.into(),
                loaders,
            }),
        }
    }

    /// A product embedded in another payload
    pub fn from_summary(summary: Arc<OccProduct>, loaders: RequestLoaders) -> Self {
        Self {
            entity: LazyEntity::new(ProductSource {
                sku: summary.code.clone(),
                loaders,
            }),
            summary: Some(summary),
        }
    }

    async fn field<T>(&self, pick: impl Fn(&OccProduct) -> Option<T>) -> ApiResult<Option<T>> {
        if let Some(value) = self.summary.as_deref().and_then(|summary| pick(summary)) {
            return Ok(Some(value));
        }
        self.entity.get(|product| pick(&**product)).await
    }
}

#[Object(rename_fields = "snake_case")]
impl Product {
    /// Stock keeping unit (the backend product code)
    async fn sku(&self) -> &str {
        &self.entity.source().sku
    }

    async fn name(&self) -> Result<Option<String>> {
        self.field(|product| product.name.clone()).await.extend()
    }

    async fn description(&self) -> Result<Option<ComplexTextValue>> {
        self.field(|product| {
            product
                .description
                .clone()
                .map(|html| ComplexTextValue { html })
        })
        .await
        .extend()
    }

    async fn url_key(&self) -> Result<Option<String>> {
        self.field(|product| product.url.as_deref().and_then(url_key))
            .await
            .extend()
    }

    async fn stock_status(&self) -> Result<Option<ProductStockStatus>> {
        self.field(|product| {
            product
                .stock
                .as_ref()
                .and_then(|stock| stock.stock_level_status.as_deref())
                .map(ProductStockStatus::from_backend)
        })
        .await
        .extend()
    }

    /// The backend has a single price per product, so regular and final
    /// price are the same amount.
    async fn price_range(&self) -> Result<Option<PriceRange>> {
        self.field(|product| {
            product.price.as_ref().map(|price| PriceRange {
                minimum_price: ProductPrice {
                    regular_price: Money::from(price),
                    final_price: Money::from(price),
                },
            })
        })
        .await
        .extend()
    }

    /// Categories the product is assigned to
    async fn categories(&self) -> Result<Vec<CategoryTree>> {
        let codes = self
            .field(|product| {
                (!product.categories.is_empty()).then(|| {
                    product
                        .categories
                        .iter()
                        .map(|category| category.code.clone())
                        .collect::<Vec<_>>()
                })
            })
            .await
            .extend()?
            .unwrap_or_default();
        let loaders = &self.entity.source().loaders;

        Ok(codes
            .into_iter()
            .map(|code| CategoryTree::new(code, loaders.clone()))
            .collect())
    }
}
