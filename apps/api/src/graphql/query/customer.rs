//! Customer queries

use async_graphql::{Context, Object, Result, ResultExt};

use crate::graphql::loaders::RequestLoaders;
use crate::graphql::types::Customer;

#[derive(Default)]
pub struct CustomerQuery;

#[Object]
impl CustomerQuery {
    /// The signed-in customer
    ///
    /// # Errors
    /// Returns UNAUTHORIZED when no bearer token is sent
    async fn customer(&self, ctx: &Context<'_>) -> Result<Option<Customer>> {
        let loaders = ctx.data::<RequestLoaders>()?;
        loaders.session().require_token().extend()?;
        Ok(Some(Customer::new(loaders.clone())))
    }
}
