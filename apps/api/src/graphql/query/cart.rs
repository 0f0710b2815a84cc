//! Cart queries

use async_graphql::{Context, Object, Result, ResultExt};

use crate::graphql::loaders::RequestLoaders;
use crate::graphql::types::Cart;

#[derive(Default)]
pub struct CartQuery;

#[Object]
impl CartQuery {
    /// Cart owned by the caller: a guest cart guid, or a customer cart code
    /// when a bearer token is sent
    async fn cart(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "cart_id")] cart_id: String,
    ) -> Result<Option<Cart>> {
        let loaders = ctx.data::<RequestLoaders>()?;
        Ok(Some(Cart::new(loaders.cart_key(cart_id), loaders.clone())))
    }

    /// Active cart of the signed-in customer
    async fn customer_cart(&self, ctx: &Context<'_>) -> Result<Option<Cart>> {
        let loaders = ctx.data::<RequestLoaders>()?;
        let key = loaders.customer_cart_key().extend()?;
        Ok(Some(Cart::new(key, loaders.clone())))
    }
}
