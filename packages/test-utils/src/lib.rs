//! Shared test utilities for the commerce bridge workspace
//!
//! This crate provides a mock commerce backend for testing without network
//! dependencies. The mock is used by the backend client and API test suites.
//!
//! # Mock Services
//!
//! - [`MockOccServer`] - Mock OCC REST backend for carts, customers, catalog and orders
//!
//! # Fixtures
//!
//! Builders such as [`CartFixture`] and [`CategoryFixture`] render OCC shaped
//! JSON payloads.
//!
//! # Example
//!
//! ```rust,ignore
//! use commerce_bridge_test_utils::{CartFixture, MockOccServer, ProductFixture};
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let occ = MockOccServer::start().await;
//!     let cart = CartFixture::empty("00000035")
//!         .with_entry(ProductFixture::new("123", "Camera", 99.0), 2);
//!     occ.mock_cart("anonymous", "00000035", &cart).await;
//!
//!     // Use occ.backend_config() to configure your client
//! }
//! ```

mod fixtures;
mod occ;

pub use fixtures::{
    occ_error, pagination, CartFixture, CategoryFixture, DeliveryModeFixture, EntryFixture,
    OrderFixture, ProductFixture, UserFixture,
};
pub use occ::{MockOccServer, OCC_ROOT};
