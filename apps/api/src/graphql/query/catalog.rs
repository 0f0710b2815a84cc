//! Catalog queries for browsing categories and products

use async_graphql::{Context, Object, Result, ResultExt};

use crate::graphql::loaders::{RequestLoaders, SearchCriteria};
use crate::graphql::pagination::{clamp_current_page, clamp_page_size, DEFAULT_PAGE_SIZE};
use crate::graphql::types::{CategoryTree, Product, Products};

#[derive(Default)]
pub struct CatalogQuery;

#[Object]
impl CatalogQuery {
    // ==================== Category Queries ====================

    /// Get a category by id
    async fn category(&self, ctx: &Context<'_>, id: String) -> Result<Option<CategoryTree>> {
        let loaders = ctx.data::<RequestLoaders>()?;
        Ok(Some(CategoryTree::new(id, loaders.clone())))
    }

    /// Get several categories; their lookups share one batch
    async fn category_list(&self, ctx: &Context<'_>, ids: Vec<String>) -> Result<Vec<CategoryTree>> {
        let loaders = ctx.data::<RequestLoaders>()?;
        Ok(ids
            .into_iter()
            .map(|id| CategoryTree::new(id, loaders.clone()))
            .collect())
    }

    // ==================== Product Queries ====================

    /// Full text product search
    async fn products(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
        #[graphql(default_with = "DEFAULT_PAGE_SIZE")] page_size: i32,
        #[graphql(default = 1)] current_page: i32,
        sort: Option<String>,
    ) -> Result<Option<Products>> {
        let loaders = ctx.data::<RequestLoaders>()?;
        let criteria = SearchCriteria {
            sort,
            ..SearchCriteria::text(
                search.unwrap_or_default(),
                clamp_page_size(page_size),
                clamp_current_page(current_page),
            )
        };
        Products::new(criteria, loaders.clone()).map(Some).extend()
    }

    /// Get a product by SKU
    async fn product(&self, ctx: &Context<'_>, sku: String) -> Result<Option<Product>> {
        let loaders = ctx.data::<RequestLoaders>()?;
        Ok(Some(Product::new(sku, loaders.clone())))
    }
}
