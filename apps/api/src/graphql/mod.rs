//! GraphQL schema and resolvers for the commerce bridge
//!
//! This module contains the async-graphql schema including:
//! - Request-scoped batch loaders, one per backend resource
//! - Lazily resolved entity types (carts, customers, catalog)
//! - Query and mutation roots

pub mod loaders;
pub mod mutation;
pub mod pagination;
pub mod query;
pub mod schema;
pub mod types;

pub use loaders::{BackendSession, RequestLoaders};
pub use schema::{build_schema, BridgeSchema, SchemaBuilder};
