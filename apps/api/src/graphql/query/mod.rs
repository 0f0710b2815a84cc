//! GraphQL queries for the commerce bridge
//!
//! This module contains all query resolvers, organized by domain.

mod cart;
mod catalog;
mod customer;

pub use cart::CartQuery;
pub use catalog::CatalogQuery;
pub use customer::CustomerQuery;

use async_graphql::MergedObject;

/// Root query type combining all query domains
#[derive(MergedObject, Default)]
pub struct Query(CartQuery, CustomerQuery, CatalogQuery);
