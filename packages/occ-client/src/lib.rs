//! OCC commerce REST API client
//!
//! This crate provides a client for an OCC-style commerce backend, covering:
//! - Carts, their delivery modes and vouchers
//! - Customers and their order history
//! - Categories and products, including product search
//!
//! # Example
//!
//! ```rust,no_run
//! use commerce_bridge_occ_client::{OccClient, ANONYMOUS_USER};
//! use commerce_bridge_shared_config::BackendConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OccClient::new(&BackendConfig::from_env()?)?;
//!
//! let cart = client.get_cart(ANONYMOUS_USER, "a1b2c3", None).await?;
//! for entry in cart.entries {
//!     println!("{:?} x{:?}", entry.product.map(|p| p.code), entry.quantity);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod models;

pub use client::{BackendStatus, OccClient, ANONYMOUS_USER, CURRENT_USER};
pub use error::{OccError, OccResult};
pub use models::{
    Address, Cart, CartModification, Category, CategoryRef, Country, DeliveryMode,
    DeliveryModeList, Order, OrderEntry, OrderHistory, OrderHistoryList, Pagination, Price,
    Principal, Product, ProductSearchPage, SearchQuery, Stock, User, Voucher, VoucherList,
};
