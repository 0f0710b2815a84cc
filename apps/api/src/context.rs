//! Process-wide application context
//!
//! Built once at startup and handed to every handler as an axum
//! `Extension`. Nothing in here is request specific; handlers derive the
//! per-request loaders from it.

use commerce_bridge_occ_client::OccClient;
use commerce_bridge_shared_config::LoaderConfig;

use crate::graphql::{BackendSession, BridgeSchema, RequestLoaders};

#[derive(Clone)]
pub struct AppContext {
    pub schema: BridgeSchema,
    pub client: OccClient,
    pub loader_config: LoaderConfig,
}

impl AppContext {
    pub fn new(schema: BridgeSchema, client: OccClient, loader_config: LoaderConfig) -> Self {
        Self {
            schema,
            client,
            loader_config,
        }
    }

    /// Fresh loaders (with empty caches) for one request
    pub fn request_loaders(&self, token: Option<&str>) -> RequestLoaders {
        let session = BackendSession::new(self.client.clone(), token);
        RequestLoaders::new(session, &self.loader_config)
    }
}
