//! GraphQL schema builder for the commerce bridge
//!
//! The schema is built once at startup and holds no request data: the
//! per-request loaders are attached to each request by the HTTP handler.

use async_graphql::{EmptySubscription, Schema};

use crate::config::{DEFAULT_COMPLEXITY_LIMIT, DEFAULT_DEPTH_LIMIT};

use super::mutation::Mutation;
use super::query::Query;

/// The commerce bridge GraphQL schema type
pub type BridgeSchema = Schema<Query, Mutation, EmptySubscription>;

/// Builder for constructing the GraphQL schema with query limits
pub struct SchemaBuilder {
    depth_limit: usize,
    complexity_limit: usize,
}

impl SchemaBuilder {
    /// Create a new schema builder with default limits
    pub fn new() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
            complexity_limit: DEFAULT_COMPLEXITY_LIMIT,
        }
    }

    /// Set the maximum query depth
    pub fn depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Set the maximum query complexity
    pub fn complexity_limit(mut self, complexity_limit: usize) -> Self {
        self.complexity_limit = complexity_limit;
        self
    }

    /// Build the schema
    pub fn build(self) -> BridgeSchema {
        Schema::build(Query::default(), Mutation::default(), EmptySubscription)
            .limit_depth(self.depth_limit)
            .limit_complexity(self.complexity_limit)
            .finish()
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a new GraphQL schema with the given query limits
pub fn build_schema(depth_limit: usize, complexity_limit: usize) -> BridgeSchema {
    SchemaBuilder::new()
        .depth_limit(depth_limit)
        .complexity_limit(complexity_limit)
        .build()
}
